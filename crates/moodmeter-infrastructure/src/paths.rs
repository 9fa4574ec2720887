//! Path management for moodmeter configuration and local state.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/moodmeter/         # Config directory (platform default via `dirs`)
//! ├── config.toml              # Application configuration
//! ├── local_storage.json       # Key-value local state (anonymous identity)
//! └── logs/                    # Application logs
//!     └── moodmeter.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

use moodmeter_core::error::{MoodError, Result};

const APP_DIR_NAME: &str = "moodmeter";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodMeterPaths {
    config_dir: PathBuf,
}

impl MoodMeterPaths {
    /// Resolves the config directory, preferring `override_dir` when given.
    ///
    /// # Errors
    ///
    /// `Config` when no override is given and the platform has no config directory.
    pub fn new(override_dir: Option<PathBuf>) -> Result<Self> {
        let config_dir = match override_dir {
            Some(dir) => dir,
            None => dirs::config_dir()
                .ok_or_else(|| MoodError::config("Cannot determine the platform config directory"))?
                .join(APP_DIR_NAME),
        };
        Ok(Self { config_dir })
    }

    /// Uses `dir` as the config directory as-is.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn local_storage_file(&self) -> PathBuf {
        self.config_dir.join("local_storage.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    /// Creates the config and logs directories if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_dir_is_used_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoodMeterPaths::new(Some(temp_dir.path().to_path_buf())).unwrap();

        assert_eq!(paths.config_dir(), temp_dir.path());
        assert_eq!(paths.config_file(), temp_dir.path().join("config.toml"));
        assert_eq!(paths.local_storage_file(), temp_dir.path().join("local_storage.json"));
    }

    #[test]
    fn test_ensure_dirs_creates_logs_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoodMeterPaths::at(temp_dir.path().join("nested"));

        paths.ensure_dirs().unwrap();
        assert!(paths.logs_dir().is_dir());
    }
}
