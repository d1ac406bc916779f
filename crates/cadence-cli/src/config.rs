use cadence_core::config::EngineConfig;
use cadence_core::window::DEFAULT_MAX_WINDOW_DAYS;
use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::time::Duration;

use crate::timezone::{detect_system_timezone, parse_timezone};

/// Settings read from `config.toml` and `CADENCE_*` environment variables.
/// Nested keys use a double underscore, e.g. `CADENCE_CACHE__TTL_SECS`.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// IANA zone used when printing occurrences. Detected when unset.
    #[serde(default)]
    pub display_timezone: Option<String>,
    #[serde(default = "default_max_window_days")]
    pub max_window_days: i64,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Only used when built with the `redis` feature
    #[serde(default)]
    pub redis_url: Option<String>,
}

fn default_database_path() -> String {
    "cadence.db".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_max_window_days() -> i64 {
    DEFAULT_MAX_WINDOW_DAYS
}

fn default_true() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl_secs(),
            redis_url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_level: default_log_level(),
            display_timezone: None,
            max_window_days: default_max_window_days(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("config.toml"))
                .merge(Env::prefixed("CADENCE_").split("__")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        let config: Self = figment.extract()?;
        if config.max_window_days <= 0 {
            return Err(figment::Error::from(format!(
                "max_window_days must be positive, got {}",
                config.max_window_days
            )));
        }
        Ok(config)
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            max_window_days: self.max_window_days,
            metrics_ttl: Duration::from_secs(self.cache.ttl_secs),
        }
    }

    /// The configured display zone, or the system zone when unset or invalid.
    pub fn display_timezone(&self) -> Tz {
        if let Some(name) = &self.display_timezone {
            match parse_timezone(name) {
                Ok(tz) => return tz,
                Err(e) => tracing::warn!(error = %e, "ignoring display_timezone"),
            }
        }
        parse_timezone(&detect_system_timezone()).unwrap_or(Tz::UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_any_source() {
        let config = Config::from_figment(Figment::new()).unwrap();
        assert_eq!(config.database_path, "cadence.db");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.max_window_days, 90);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 60);
        assert!(config.cache.redis_url.is_none());
    }

    #[test]
    fn test_toml_overrides_nested_keys() {
        let toml = r#"
            database_path = "/tmp/schedules.db"
            display_timezone = "Europe/Berlin"
            max_window_days = 31

            [cache]
            enabled = false
            ttl_secs = 5
        "#;
        let config = Config::from_figment(Figment::new().merge(Toml::string(toml))).unwrap();

        assert_eq!(config.database_path, "/tmp/schedules.db");
        assert_eq!(config.max_window_days, 31);
        assert!(!config.cache.enabled);
        assert_eq!(config.display_timezone(), chrono_tz::Europe::Berlin);

        let engine = config.engine();
        assert_eq!(engine.max_window_days, 31);
        assert_eq!(engine.metrics_ttl, Duration::from_secs(5));
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let result = Config::from_figment(Figment::new().merge(Toml::string("max_window_days = \"lots\"")));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_positive_window_cap_is_rejected() {
        for toml in ["max_window_days = 0", "max_window_days = -7"] {
            let err = Config::from_figment(Figment::new().merge(Toml::string(toml))).unwrap_err();
            assert!(err.to_string().contains("max_window_days must be positive"));
        }
    }

    #[test]
    fn test_huge_window_cap_is_accepted() {
        let config = Config::from_figment(Figment::new().merge(Toml::string("max_window_days = 9223372036854775807"))).unwrap();
        assert_eq!(config.engine().max_window_days, i64::MAX);
    }
}
