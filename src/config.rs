//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `FACEBOARD_*` environment overrides.
//!
//! The store list itself lives in a separate `config.json`; this file only
//! says where to find it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub pages: PagesConfig,

    #[serde(default)]
    pub stores: StoresSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Health monitor configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthConfig {
    #[serde(default = "default_health_interval")]
    pub interval_secs: u64,
}

fn default_health_interval() -> u64 {
    300 // 5 minutes
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_health_interval(),
        }
    }
}

/// Page loading configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PagesConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,
}

fn default_page_size() -> u32 {
    20
}

fn default_recent_limit() -> u32 {
    5
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            recent_limit: default_recent_limit(),
        }
    }
}

/// Where the store list comes from and which store to prefer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoresSettings {
    /// Path or http(s) URL of `config.json`
    #[serde(default = "default_stores_source")]
    pub source: String,

    /// Store to select instead of the list's default
    #[serde(default)]
    pub store: Option<String>,
}

fn default_stores_source() -> String {
    "./config.json".to_string()
}

impl Default for StoresSettings {
    fn default() -> Self {
        Self {
            source: default_stores_source(),
            store: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse TOML content
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> LoadedConfig {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("faceboard").join("config.toml")),
            Some(PathBuf::from("/etc/faceboard/config.toml")),
            Some(PathBuf::from("./faceboard.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first existing file that parses, remembering the ones that
    /// didn't. Logging is not up yet, so nothing is traced here.
    pub fn load_first(paths: &[PathBuf]) -> LoadedConfig {
        let mut skipped = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: Some(path.clone()),
                        skipped,
                    }
                }
                Err(e) => skipped.push(e),
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            source: None,
            skipped,
        }
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Client overrides
        if let Some(timeout) = var("FACEBOARD_REQUEST_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.client.request_timeout_secs = timeout;
        }

        // Health overrides
        if let Some(interval) = var("FACEBOARD_HEALTH_INTERVAL").and_then(|v| v.parse().ok()) {
            self.health.interval_secs = interval;
        }

        // Page overrides
        if let Some(size) = var("FACEBOARD_PAGE_SIZE").and_then(|v| v.parse().ok()) {
            self.pages.page_size = size;
        }

        // Store overrides
        if let Some(source) = var("FACEBOARD_STORES") {
            self.stores.source = source;
        }
        if let Some(store) = var("FACEBOARD_STORE") {
            self.stores.store = Some(store);
        }

        // Logging overrides
        if let Some(level) = var("FACEBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("FACEBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Result of searching the default locations
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config came from; `None` means defaults plus environment
    pub source: Option<PathBuf>,
    /// Files that existed but could not be loaded
    pub skipped: Vec<ConfigError>,
}

impl LoadedConfig {
    /// Report where the config came from. Call once logging is initialized.
    pub fn log(&self) {
        for e in &self.skipped {
            tracing::warn!("{}", e);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::debug!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Failed to fetch config from {url}: {error}")]
    Fetch { url: String, error: String },

    #[error("No active stores available")]
    NoActiveStore,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Faceboard Configuration
#
# Environment variables override these settings:
# - FACEBOARD_REQUEST_TIMEOUT
# - FACEBOARD_HEALTH_INTERVAL
# - FACEBOARD_PAGE_SIZE
# - FACEBOARD_STORES
# - FACEBOARD_STORE
# - FACEBOARD_LOG_LEVEL
# - FACEBOARD_LOG_FORMAT

[client]
# Request timeout in seconds (health checks always use 5s)
request_timeout_secs = 30

[health]
# Seconds between background health checks
interval_secs = 300

[pages]
# Items per page on the sessions and people lists
page_size = 20

# Items in the dashboard's live sessions / recent visitors widgets
recent_limit = 5

[stores]
# Store list: local path or http(s) URL of config.json
source = "./config.json"

# Store to select instead of the list's default_store
# store = "main"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/faceboard/faceboard.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.client.request_timeout_secs, 30);
        assert_eq!(config.health.interval_secs, 300);
        assert_eq!(config.pages.page_size, 20);
        assert_eq!(config.pages.recent_limit, 5);
        assert_eq!(config.stores.source, "./config.json");
        assert!(config.stores.store.is_none());
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::from_toml(&generate_default_config()).unwrap();
        assert_eq!(config.health.interval_secs, 300);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[health]\ninterval_secs = 60\n\n[stores]\nstore = \"mall\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.health.interval_secs, 60);
        assert_eq!(config.stores.store.as_deref(), Some("mall"));
        assert_eq!(config.pages.page_size, 20);
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/faceboard.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[health\ninterval_secs =").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_first_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        std::fs::write(&broken, "[stores\nstore =").unwrap();
        std::fs::write(&good, "[pages]\nrecent_limit = 9\n").unwrap();

        let paths = vec![dir.path().join("absent.toml"), broken.clone(), good.clone()];
        let loaded = Config::load_first(&paths);

        assert_eq!(loaded.source.as_deref(), Some(good.as_path()));
        assert_eq!(loaded.config.pages.recent_limit, 9);
        assert_eq!(loaded.skipped.len(), 1);
        assert!(matches!(&loaded.skipped[0], ConfigError::Parse { path, .. } if *path == broken));
    }

    #[test]
    fn test_load_first_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_first(&[dir.path().join("absent.toml")]);

        assert!(loaded.source.is_none());
        assert!(loaded.skipped.is_empty());
        assert_eq!(loaded.config.pages.recent_limit, 5);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FACEBOARD_STORES", "https://dash.example/config.json"),
            ("FACEBOARD_HEALTH_INTERVAL", "30"),
            ("FACEBOARD_PAGE_SIZE", "not-a-number"),
            ("FACEBOARD_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.stores.source, "https://dash.example/config.json");
        assert_eq!(config.health.interval_secs, 30);
        assert_eq!(config.pages.page_size, 20);
        assert_eq!(config.logging.format, "json");
    }
}
