use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Where tuiman keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub state_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// One JSON file per saved request.
    pub requests_dir: PathBuf,
    pub history_db: PathBuf,
}

impl AppPaths {
    /// XDG-style layout under `$HOME`.
    pub fn from_env() -> Result<Self> {
        let home = match std::env::var_os("HOME") {
            Some(h) if !h.is_empty() => PathBuf::from(h),
            _ => bail!("$HOME is not set"),
        };
        Ok(Self::from_home(&home))
    }

    pub fn from_home(home: &Path) -> Self {
        Self::from_dirs(
            home.join(".config").join("tuiman"),
            home.join(".local").join("state").join("tuiman"),
            home.join(".cache").join("tuiman"),
        )
    }

    pub fn from_dirs(config_dir: PathBuf, state_dir: PathBuf, cache_dir: PathBuf) -> Self {
        Self {
            requests_dir: config_dir.join("requests"),
            history_db: state_dir.join("history.db"),
            config_dir,
            state_dir,
            cache_dir,
        }
    }

    /// Replace the config and/or state roots (derived paths follow).
    pub fn with_overrides(self, config_dir: Option<PathBuf>, state_dir: Option<PathBuf>) -> Self {
        Self::from_dirs(
            config_dir.unwrap_or(self.config_dir),
            state_dir.unwrap_or(self.state_dir),
            self.cache_dir,
        )
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.state_dir.join("tuiman.log")
    }

    /// Create every directory that does not exist yet.
    pub fn ensure(&self) -> Result<()> {
        for dir in [
            &self.config_dir,
            &self.state_dir,
            &self.cache_dir,
            &self.requests_dir,
        ] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}
