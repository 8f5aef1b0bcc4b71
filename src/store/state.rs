//! Store State
//!
//! Immutable snapshot of store selection and health, changed only by
//! reducing [`StoreAction`]s.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{ConnectionStatus, Store, StoresConfig};

/// Message shown when `config.json` cannot be loaded
pub const CONFIG_LOAD_ERROR: &str = "Failed to load configuration";

/// Snapshot of the store layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreState {
    /// All configured stores, active or not
    pub stores: Vec<Store>,
    /// Currently selected store
    pub current: Option<Store>,
    /// Latest health reading for `current`
    pub connection: ConnectionStatus,
    /// Config load or store switch in progress
    pub loading: bool,
    /// Page-level error, e.g. configuration failure
    pub error: Option<String>,
    /// When `connection` was last refreshed
    pub last_health_check: Option<DateTime<Utc>>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            stores: Vec::new(),
            current: None,
            connection: ConnectionStatus::unknown(),
            loading: true,
            error: None,
            last_health_check: None,
        }
    }
}

/// State transitions of the store layer
#[derive(Debug, Clone)]
pub enum StoreAction {
    /// Config load started
    LoadStarted,
    /// Config loaded; selects the default active store
    ConfigLoaded(StoresConfig),
    /// Config could not be loaded or has no usable store
    ConfigFailed(String),
    /// Select a store; ignored unless it exists and is active
    SelectStore(String),
    /// Health result for a store; ignored unless that store is still selected
    HealthChecked {
        store_id: String,
        status: ConnectionStatus,
        at: DateTime<Utc>,
    },
    /// Load or switch finished
    LoadingFinished,
}

impl StoreState {
    /// Apply an action, returning the next state
    pub fn reduce(mut self, action: StoreAction) -> Self {
        self.apply(action);
        self
    }

    /// Apply an action in place
    pub fn apply(&mut self, action: StoreAction) {
        match action {
            StoreAction::LoadStarted => {
                self.loading = true;
                self.error = None;
            }
            StoreAction::ConfigLoaded(config) => {
                self.current = config.default_active_store().cloned();
                self.stores = config.stores;
                self.connection = ConnectionStatus::unknown();
                self.last_health_check = None;
                self.error = None;
            }
            StoreAction::ConfigFailed(message) => {
                self.error = Some(message);
            }
            StoreAction::SelectStore(id) => {
                if let Some(store) = self.switchable(&id).cloned() {
                    self.current = Some(store);
                    self.connection = ConnectionStatus::unknown();
                    self.last_health_check = None;
                    self.loading = true;
                }
            }
            StoreAction::HealthChecked {
                store_id,
                status,
                at,
            } => {
                if self.current_id() == Some(store_id.as_str()) {
                    self.connection = status;
                    self.last_health_check = Some(at);
                }
            }
            StoreAction::LoadingFinished => {
                self.loading = false;
            }
        }
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_ref().map(|store| store.id.as_str())
    }

    /// Stores the user may switch to
    pub fn active_stores(&self) -> impl Iterator<Item = &Store> {
        self.stores.iter().filter(|store| store.is_active())
    }

    /// The store with `id` if it exists and is active
    pub fn switchable(&self, id: &str) -> Option<&Store> {
        self.active_stores().find(|store| store.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::StoreStatus;

    fn store(id: &str, status: StoreStatus) -> Store {
        Store {
            id: id.to_string(),
            name: id.to_uppercase(),
            location: String::new(),
            description: String::new(),
            api_endpoint: format!("http://{}", id),
            status,
        }
    }

    fn loaded() -> StoreState {
        StoreState::default()
            .reduce(StoreAction::LoadStarted)
            .reduce(StoreAction::ConfigLoaded(StoresConfig {
                stores: vec![
                    store("a", StoreStatus::Active),
                    store("b", StoreStatus::Inactive),
                    store("c", StoreStatus::Active),
                ],
                default_store: Some("b".to_string()),
            }))
            .reduce(StoreAction::LoadingFinished)
    }

    #[test]
    fn test_initial_state() {
        let state = StoreState::default();
        assert!(state.loading);
        assert!(state.current.is_none());
        assert_eq!(state.connection, ConnectionStatus::unknown());
    }

    #[test]
    fn test_config_loaded_skips_inactive_default() {
        let state = loaded();
        assert_eq!(state.current_id(), Some("a"));
        assert_eq!(state.stores.len(), 3);
        assert_eq!(state.active_stores().count(), 2);
        assert!(!state.loading);
    }

    #[test]
    fn test_select_inactive_store_is_noop() {
        let before = loaded();
        let after = before.clone().reduce(StoreAction::SelectStore("b".to_string()));
        assert_eq!(before, after);

        let after = before.clone().reduce(StoreAction::SelectStore("missing".to_string()));
        assert_eq!(before, after);
    }

    #[test]
    fn test_select_active_store_resets_health() {
        let state = loaded()
            .reduce(StoreAction::HealthChecked {
                store_id: "a".to_string(),
                status: ConnectionStatus::offline(),
                at: Utc::now(),
            })
            .reduce(StoreAction::SelectStore("c".to_string()));

        assert_eq!(state.current_id(), Some("c"));
        assert_eq!(state.connection, ConnectionStatus::unknown());
        assert!(state.loading);
        assert!(state.last_health_check.is_none());
    }

    #[test]
    fn test_stale_health_result_is_dropped() {
        let state = loaded().reduce(StoreAction::HealthChecked {
            store_id: "c".to_string(),
            status: ConnectionStatus::offline(),
            at: Utc::now(),
        });
        assert_eq!(state.connection, ConnectionStatus::unknown());
        assert!(state.last_health_check.is_none());
    }

    #[test]
    fn test_config_failed_sets_error() {
        let state = StoreState::default()
            .reduce(StoreAction::ConfigFailed(CONFIG_LOAD_ERROR.to_string()))
            .reduce(StoreAction::LoadingFinished);
        assert_eq!(state.error.as_deref(), Some(CONFIG_LOAD_ERROR));
        assert!(!state.loading);

        let state = state.reduce(StoreAction::LoadStarted);
        assert!(state.error.is_none());
    }
}
