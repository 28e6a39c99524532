//! Configuration management for LoonSec components

use loonsec_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// NVD client settings
    #[serde(default)]
    pub nvd: NvdConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Merge with environment variables (LOONSEC_ prefix)
    pub fn merge_env(mut self) -> Self {
        if let Ok(val) = std::env::var("LOONSEC_NVD_API_URL") {
            self.nvd.api_url = val;
        }
        if let Ok(val) = std::env::var("LOONSEC_NVD_API_KEY") {
            self.nvd.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("LOONSEC_NVD_RETRY_COUNT") {
            if let Ok(n) = val.parse() {
                self.nvd.retry_count = n;
            }
        }
        if let Ok(val) = std::env::var("LOONSEC_NVD_CACHING") {
            if let Ok(b) = val.parse() {
                self.nvd.caching = b;
            }
        }
        if let Ok(val) = std::env::var("LOONSEC_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("LOONSEC_LOG_FORMAT") {
            self.logging.format = val;
        }

        self
    }
}

/// NVD client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdConfig {
    /// NVD API URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// NVD API key (optional, for higher rate limits)
    pub api_key: Option<String>,

    /// Number of attempts per single-CVE lookup
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Whether lookups consult and populate the in-memory record cache
    #[serde(default = "default_true")]
    pub caching: bool,

    /// Advertised max age for cached records in seconds.
    ///
    /// Accepted for forward compatibility; cached records currently never
    /// expire regardless of this value.
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_seconds: u64,
}

fn default_api_url() -> String {
    String::from("https://services.nvd.nist.gov/rest/json/cves/2.0")
}

fn default_retry_count() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_cache_max_age() -> u64 {
    3600
}

impl Default for NvdConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            retry_count: 3,
            caching: true,
            cache_max_age_seconds: 3600,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("pretty")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("pretty"),
        }
    }
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.nvd.api_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.nvd.api_key = Some(key.into());
        self
    }

    pub fn retry_count(mut self, count: u32) -> Self {
        self.config.nvd.retry_count = count;
        self
    }

    pub fn caching(mut self, enabled: bool) -> Self {
        self.config.nvd.caching = enabled;
        self
    }

    pub fn cache_max_age_seconds(mut self, seconds: u64) -> Self {
        self.config.nvd.cache_max_age_seconds = seconds;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [nvd]
            api_key = "secret-key"
            retry_count = 5
            caching = false

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.nvd.api_key, Some(String::from("secret-key")));
        assert_eq!(config.nvd.retry_count, 5);
        assert!(!config.nvd.caching);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(
            config.nvd.api_url,
            "https://services.nvd.nist.gov/rest/json/cves/2.0"
        );
        assert_eq!(config.nvd.api_key, None);
        assert_eq!(config.nvd.retry_count, 3);
        assert!(config.nvd.caching);
        assert_eq!(config.nvd.cache_max_age_seconds, 3600);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder()
            .api_key("key123")
            .retry_count(1)
            .caching(false)
            .log_level("warn")
            .build();

        assert_eq!(config.nvd.api_key, Some(String::from("key123")));
        assert_eq!(config.nvd.retry_count, 1);
        assert!(!config.nvd.caching);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_config_invalid_toml() {
        let result = Config::from_toml("[nvd\nretry_count = ");
        assert!(result.is_err());
    }
}
