//! Application configuration as stored in `config.toml`.

use serde::{Deserialize, Serialize};

use crate::sync::WritePolicy;

pub const ENV_BACKEND_URL: &str = "MOODMETER_BACKEND_URL";
pub const ENV_ANON_KEY: &str = "MOODMETER_ANON_KEY";
pub const ENV_LOG_LEVEL: &str = "MOODMETER_LOG_LEVEL";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MoodMeterConfig {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub identity: IdentitySettings,
    #[serde(default)]
    pub sync: WritePolicy,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Datastore connection and table naming.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BackendSettings {
    pub url: String,
    pub anon_key: String,
    pub table: String,
    pub channel: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            table: "mood_selections".to_string(),
            channel: "mood-changes".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct IdentitySettings {
    /// Key under which the anonymous identity is persisted.
    pub storage_key: String,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            storage_key: "moodmeter-session".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. `info` or `moodmeter_core=debug`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl MoodMeterConfig {
    /// Applies environment overrides through `lookup` (normally `std::env::var`).
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BACKEND_URL) {
            self.backend.url = url;
        }
        if let Some(key) = get(ENV_ANON_KEY) {
            self.backend.anon_key = key;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }

    /// Both the backend URL and key are set.
    pub fn has_backend_credentials(&self) -> bool {
        !self.backend.url.is_empty() && !self.backend.anon_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::FailureAction;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config: MoodMeterConfig = toml::from_str("").unwrap();
        assert_eq!(config, MoodMeterConfig::default());
        assert_eq!(config.backend.table, "mood_selections");
        assert_eq!(config.backend.channel, "mood-changes");
        assert_eq!(config.identity.storage_key, "moodmeter-session");
        assert_eq!(config.sync, WritePolicy::default());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: MoodMeterConfig = toml::from_str(
            r#"
            [backend]
            url = "https://example.test"

            [sync]
            on_create_failure = "revert"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.url, "https://example.test");
        assert_eq!(config.backend.table, "mood_selections");
        assert_eq!(config.sync.on_create_failure, FailureAction::Revert);
        assert_eq!(config.sync.on_update_failure, FailureAction::Revert);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_BACKEND_URL, "https://env.test"),
            (ENV_ANON_KEY, "secret"),
            (ENV_LOG_LEVEL, "  "),
        ]);
        let mut config = MoodMeterConfig::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.backend.url, "https://env.test");
        assert!(config.has_backend_credentials());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = MoodMeterConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[backend]"));
        let parsed: MoodMeterConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
