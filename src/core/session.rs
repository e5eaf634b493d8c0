use serde::{Deserialize, Serialize};
use std::path::Path;

use super::layout::SplitRatios;

/// UI state persisted across restarts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Divider positions as the user last left them.
    #[serde(default)]
    pub ratios: SplitRatios,

    /// Request selected when the session was last saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_request: Option<String>,
}

impl SessionState {
    /// Load from `path`; a missing or unreadable file yields the defaults.
    pub fn load(path: &Path) -> Self {
        if let Ok(contents) = std::fs::read_to_string(path) {
            match serde_json::from_str(&contents) {
                Ok(state) => return state,
                Err(e) => tracing::warn!("ignoring unreadable session {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
