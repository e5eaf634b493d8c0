use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// User settings loaded from ~/.config/tuiman/settings.json
///
/// When adding a field, give it `#[serde(default = "...")]` and add it to the
/// `Default` impl. [`Settings::load`] rewrites the file afterwards, so older
/// files pick up new fields with their defaults and keep existing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Rows fetched from the run history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Upper bound on a single HTTP request, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// External editor command; falls back to $VISUAL, $EDITOR, then `vi`.
    #[serde(default)]
    pub editor: Option<String>,

    /// tracing filter directive used when TUIMAN_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Capture mouse events so dividers can be dragged.
    #[serde(default = "default_mouse")]
    pub mouse: bool,
}

fn default_history_limit() -> usize {
    200
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_mouse() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            history_limit: default_history_limit(),
            http_timeout_secs: default_http_timeout_secs(),
            editor: None,
            log_level: default_log_level(),
            mouse: default_mouse(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or invalid. The file is rewritten either way so it always
    /// lists every setting.
    pub fn load(path: &Path) -> Self {
        match Self::load_with_validation(path) {
            Ok(settings) => {
                if let Err(e) = settings.save(path) {
                    tracing::warn!("failed to update settings file: {}", e);
                }
                settings
            }
            Err(e) => {
                tracing::warn!("{}. Using defaults.", e);
                let defaults = Settings::default();
                if let Err(save_err) = defaults.save(path) {
                    tracing::warn!("failed to write default settings: {}", save_err);
                }
                defaults
            }
        }
    }

    /// Returns descriptive errors for the log.
    pub fn load_with_validation(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file at {}: {}", path.display(), e))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse settings.json: {}. Check JSON syntax.", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), String> {
        if self.history_limit == 0 {
            return Err("history_limit must be at least 1".to_string());
        }
        if self.http_timeout_secs == 0 {
            return Err("http_timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// The editor command to launch: setting, $VISUAL, $EDITOR, then `vi`.
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| std::env::var("VISUAL").ok().filter(|e| !e.trim().is_empty()))
            .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
            .unwrap_or_else(|| "vi".to_string())
    }
}
