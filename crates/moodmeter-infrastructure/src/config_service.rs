//! Configuration service.
//!
//! Loads `config.toml` from the config directory, writing defaults when the
//! file is missing, and caches the result.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use moodmeter_core::config::MoodMeterConfig;
use moodmeter_core::error::{MoodError, Result};

use crate::storage::AtomicFile;

/// Loads and caches the application configuration.
///
/// Environment overrides are applied on every load and never written back.
#[derive(Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<MoodMeterConfig>>>,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the configuration, loading it on first access.
    pub fn get_config(&self) -> Result<MoodMeterConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|e| MoodError::internal(format!("config lock poisoned: {}", e)))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let mut loaded = self.load_or_create()?;
        loaded.apply_env_overrides(|key| std::env::var(key).ok());

        let mut write_lock = self
            .config
            .write()
            .map_err(|e| MoodError::internal(format!("config lock poisoned: {}", e)))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_or_create(&self) -> Result<MoodMeterConfig> {
        let file = AtomicFile::<MoodMeterConfig>::toml(self.path.clone());

        match file.load()? {
            Some(config) => {
                tracing::debug!("[ConfigService] Loaded {}", self.path.display());
                Ok(config)
            }
            None => {
                let config = MoodMeterConfig::default();
                file.save(&config)?;
                tracing::info!(
                    "[ConfigService] Wrote default configuration to {}",
                    self.path.display()
                );
                Ok(config)
            }
        }
    }
}
