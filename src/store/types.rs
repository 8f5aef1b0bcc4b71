//! Store Types
//!
//! Store definitions as read from `config.json`, and the coarse
//! three-way connection status derived from health checks.

use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

use crate::api::HealthResponse;
use crate::config::ConfigError;

/// A tenant/location the dashboard can point at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    /// Base URL of the store backend
    pub api_endpoint: String,
    #[serde(default)]
    pub status: StoreStatus,
}

impl Store {
    pub fn is_active(&self) -> bool {
        self.status == StoreStatus::Active
    }
}

/// Whether a store may be selected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Active,
    #[default]
    Inactive,
    /// Any status string other than active/inactive
    #[serde(other)]
    Unknown,
}

/// Contents of `config.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoresConfig {
    #[serde(default)]
    pub stores: Vec<Store>,
    #[serde(default)]
    pub default_store: Option<String>,
}

impl StoresConfig {
    /// Parse `config.json` contents
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from a local file or an http(s) URL
    pub async fn load(source: &StoreSource, http: &reqwest::Client) -> Result<Self, ConfigError> {
        match source {
            StoreSource::File(path) => Self::load_file(path),
            StoreSource::Url(url) => Self::fetch(url, http).await,
        }
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_json(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    async fn fetch(url: &str, http: &reqwest::Client) -> Result<Self, ConfigError> {
        let fetch_error = |error: String| ConfigError::Fetch {
            url: url.to_string(),
            error,
        };

        let response = http
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!(
                "Failed to load config: {}",
                response.status().as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        Self::from_json(&body).map_err(|e| fetch_error(e.to_string()))
    }

    /// Stores that may be selected
    pub fn active_stores(&self) -> impl Iterator<Item = &Store> {
        self.stores.iter().filter(|store| store.is_active())
    }

    /// The configured default if it is active, else the first active store
    pub fn default_active_store(&self) -> Option<&Store> {
        self.default_store
            .as_deref()
            .and_then(|id| self.active_stores().find(|store| store.id == id))
            .or_else(|| self.active_stores().next())
    }
}

/// Where `config.json` comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    File(PathBuf),
    Url(String),
}

impl From<&str> for StoreSource {
    fn from(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            StoreSource::Url(s.to_string())
        } else {
            StoreSource::File(PathBuf::from(s))
        }
    }
}

impl std::fmt::Display for StoreSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreSource::File(path) => write!(f, "{}", path.display()),
            StoreSource::Url(url) => f.write_str(url),
        }
    }
}

/// Status of one backend component as reported by `/health`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ComponentStatus {
    Connected,
    Disconnected,
    Online,
    Offline,
    Active,
    Inactive,
    #[default]
    Unknown,
    Other(String),
}

/// Coarse reading of a [`ComponentStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Up,
    Down,
    Unknown,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentStatus::Connected => "connected",
            ComponentStatus::Disconnected => "disconnected",
            ComponentStatus::Online => "online",
            ComponentStatus::Offline => "offline",
            ComponentStatus::Active => "active",
            ComponentStatus::Inactive => "inactive",
            ComponentStatus::Unknown => "unknown",
            ComponentStatus::Other(s) => s,
        }
    }

    pub fn level(&self) -> StatusLevel {
        match self {
            ComponentStatus::Connected | ComponentStatus::Online | ComponentStatus::Active => {
                StatusLevel::Up
            }
            ComponentStatus::Disconnected
            | ComponentStatus::Offline
            | ComponentStatus::Inactive => StatusLevel::Down,
            ComponentStatus::Unknown | ComponentStatus::Other(_) => StatusLevel::Unknown,
        }
    }

    /// Indicator label shown next to the component
    pub fn label(&self) -> &'static str {
        match self.level() {
            StatusLevel::Up => "Connected",
            StatusLevel::Down => "Disconnected",
            StatusLevel::Unknown => "Unknown",
        }
    }
}

impl From<&str> for ComponentStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "connected" => ComponentStatus::Connected,
            "disconnected" => ComponentStatus::Disconnected,
            "online" => ComponentStatus::Online,
            "offline" => ComponentStatus::Offline,
            "active" => ComponentStatus::Active,
            "inactive" => ComponentStatus::Inactive,
            "unknown" | "" => ComponentStatus::Unknown,
            _ => ComponentStatus::Other(s.to_string()),
        }
    }
}

impl std::fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ComponentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Database / API / processing status of the selected store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub database: ComponentStatus,
    pub api: ComponentStatus,
    pub processing: ComponentStatus,
}

impl ConnectionStatus {
    /// Before any health check has completed
    pub fn unknown() -> Self {
        Self {
            database: ComponentStatus::Unknown,
            api: ComponentStatus::Unknown,
            processing: ComponentStatus::Unknown,
        }
    }

    /// Any failed health check, regardless of response body
    pub fn offline() -> Self {
        Self {
            database: ComponentStatus::Disconnected,
            api: ComponentStatus::Offline,
            processing: ComponentStatus::Inactive,
        }
    }

    /// Successful health check; missing or blank sub-statuses assume healthy
    pub fn from_health(health: &HealthResponse) -> Self {
        Self {
            database: reported(&health.database_status).unwrap_or(ComponentStatus::Connected),
            api: ComponentStatus::Online,
            processing: reported(&health.processing_status).unwrap_or(ComponentStatus::Active),
        }
    }

    pub fn is_online(&self) -> bool {
        self.api.level() == StatusLevel::Up
    }
}

fn reported(status: &Option<String>) -> Option<ComponentStatus> {
    status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ComponentStatus::from)
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "stores": [
            { "id": "closed", "name": "Closed", "api_endpoint": "http://closed", "status": "inactive" },
            { "id": "main", "name": "Main St", "location": "Downtown", "api_endpoint": "http://main", "status": "active" },
            { "id": "mall", "name": "Mall", "api_endpoint": "http://mall", "status": "active" },
            { "id": "odd", "name": "Odd", "api_endpoint": "http://odd", "status": "paused" }
        ],
        "default_store": "mall"
    }"#;

    #[test]
    fn test_parse_stores_config() {
        let config = StoresConfig::from_json(CONFIG).unwrap();
        assert_eq!(config.stores.len(), 4);
        assert_eq!(config.stores[0].status, StoreStatus::Inactive);
        assert_eq!(config.stores[1].location, "Downtown");
        assert_eq!(config.stores[3].status, StoreStatus::Unknown);
        assert_eq!(config.active_stores().count(), 2);
    }

    #[test]
    fn test_default_store_prefers_configured_id() {
        let config = StoresConfig::from_json(CONFIG).unwrap();
        assert_eq!(config.default_active_store().unwrap().id, "mall");
    }

    #[test]
    fn test_inactive_default_falls_back_to_first_active() {
        let mut config = StoresConfig::from_json(CONFIG).unwrap();
        config.default_store = Some("closed".to_string());
        assert_eq!(config.default_active_store().unwrap().id, "main");

        config.default_store = None;
        assert_eq!(config.default_active_store().unwrap().id, "main");

        config.stores.retain(|s| !s.is_active());
        assert!(config.default_active_store().is_none());
    }

    #[test]
    fn test_store_source_from_str() {
        assert_eq!(
            StoreSource::from("https://dash.example/config.json"),
            StoreSource::Url("https://dash.example/config.json".to_string())
        );
        assert_eq!(
            StoreSource::from("./config.json"),
            StoreSource::File(PathBuf::from("./config.json"))
        );
    }

    #[test]
    fn test_connection_status_from_health() {
        let status = ConnectionStatus::from_health(&HealthResponse::default());
        assert_eq!(status.database, ComponentStatus::Connected);
        assert_eq!(status.api, ComponentStatus::Online);
        assert_eq!(status.processing, ComponentStatus::Active);
        assert!(status.is_online());

        let status = ConnectionStatus::from_health(&HealthResponse {
            database_status: Some("degraded".to_string()),
            processing_status: Some("inactive".to_string()),
        });
        assert_eq!(status.database, ComponentStatus::Other("degraded".to_string()));
        assert_eq!(status.database.level(), StatusLevel::Unknown);
        assert_eq!(status.processing.label(), "Disconnected");
    }

    #[test]
    fn test_blank_statuses_read_as_healthy() {
        let status = ConnectionStatus::from_health(&HealthResponse {
            database_status: Some(String::new()),
            processing_status: Some("  ".to_string()),
        });
        assert_eq!(status.database, ComponentStatus::Connected);
        assert_eq!(status.processing, ComponentStatus::Active);

        let status = ConnectionStatus::from_health(&HealthResponse {
            database_status: Some("unknown".to_string()),
            processing_status: None,
        });
        assert_eq!(status.database, ComponentStatus::Unknown);
    }

    #[test]
    fn test_offline_tuple() {
        let status = ConnectionStatus::offline();
        assert_eq!(status.database.as_str(), "disconnected");
        assert_eq!(status.api.as_str(), "offline");
        assert_eq!(status.processing.as_str(), "inactive");
        assert!(!status.is_online());
    }

    #[test]
    fn test_load_missing_file() {
        let err = StoresConfig::load_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
