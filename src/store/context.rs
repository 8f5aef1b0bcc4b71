//! Store Context
//!
//! Application-wide state container for store selection and health.
//! Views read snapshots or subscribe to changes; all writes go through
//! [`StoreContext::dispatch`].

use chrono::Utc;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::watch;

use super::health::{HealthMonitor, DEFAULT_HEALTH_INTERVAL};
use super::state::{StoreAction, StoreState, CONFIG_LOAD_ERROR};
use super::types::{ConnectionStatus, Store, StoreSource, StoresConfig};
use crate::api::{ApiClient, ApiError, ApiResult};
use crate::config::{Config, ConfigError};

/// Shared handle to the store layer
#[derive(Clone)]
pub struct StoreContext {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    state: watch::Sender<StoreState>,
    monitor: Mutex<Option<HealthMonitor>>,
    health_interval: Duration,
}

/// Non-owning handle held by background tasks
#[derive(Clone)]
pub(crate) struct WeakStoreContext {
    inner: Weak<Inner>,
}

impl WeakStoreContext {
    pub(crate) fn upgrade(&self) -> Option<StoreContext> {
        self.inner.upgrade().map(|inner| StoreContext { inner })
    }
}

impl StoreContext {
    /// Create an empty context with no stores loaded
    pub fn new(http: reqwest::Client, health_interval: Duration) -> Self {
        let (state, _) = watch::channel(StoreState::default());

        Self {
            inner: Arc::new(Inner {
                http,
                state,
                monitor: Mutex::new(None),
                health_interval,
            }),
        }
    }

    /// Create a context using the client and health settings from `config`
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.client.request_timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {}", e)))?;

        Ok(Self::new(
            http,
            Duration::from_secs(config.health.interval_secs),
        ))
    }

    /// Apply an action to the shared state and notify subscribers
    pub fn dispatch(&self, action: StoreAction) {
        tracing::trace!(?action, "Store action");
        self.inner.state.send_modify(|state| state.apply(action));
    }

    /// Current state snapshot
    pub fn snapshot(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    /// Receive every subsequent state change
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.state.subscribe()
    }

    pub fn current_store(&self) -> Option<Store> {
        self.inner.state.borrow().current.clone()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.inner.state.borrow().connection.clone()
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// API client for the selected store
    pub fn api(&self) -> ApiResult<ApiClient> {
        self.current_store()
            .map(|store| ApiClient::for_store(self.inner.http.clone(), &store))
            .ok_or(ApiError::NoStoreSelected)
    }

    /// Load `config.json`, select the default active store and check its
    /// health.
    ///
    /// Failures set the state's error flag; nothing is retried.
    pub async fn load_config(&self, source: &StoreSource) -> Result<(), ConfigError> {
        self.dispatch(StoreAction::LoadStarted);
        tracing::info!(source = %source, "Loading store configuration");

        let result = match StoresConfig::load(source, &self.inner.http).await {
            Ok(config) => self.apply_config(config).await,
            Err(e) => {
                tracing::error!(error = %e, "Error loading config");
                self.dispatch(StoreAction::ConfigFailed(CONFIG_LOAD_ERROR.to_string()));
                Err(e)
            }
        };

        self.dispatch(StoreAction::LoadingFinished);
        result
    }

    /// Install an already parsed store list
    pub async fn load_stores(&self, config: StoresConfig) -> Result<(), ConfigError> {
        self.dispatch(StoreAction::LoadStarted);
        let result = self.apply_config(config).await;
        self.dispatch(StoreAction::LoadingFinished);
        result
    }

    async fn apply_config(&self, config: StoresConfig) -> Result<(), ConfigError> {
        tracing::info!(stores = config.stores.len(), "Store configuration loaded");
        self.dispatch(StoreAction::ConfigLoaded(config));

        match self.current_store() {
            Some(store) => {
                tracing::info!(store = %store.name, "Default store set");
                self.check_health(&store).await;
                Ok(())
            }
            None => {
                tracing::error!("No active stores available");
                self.dispatch(StoreAction::ConfigFailed(
                    ConfigError::NoActiveStore.to_string(),
                ));
                Err(ConfigError::NoActiveStore)
            }
        }
    }

    /// Switch to another store.
    ///
    /// Returns `false` without changing anything if the store is unknown or
    /// inactive. Otherwise the new store's health is checked before
    /// returning, and a running monitor moves to the new store.
    pub async fn switch_store(&self, id: &str) -> bool {
        let Some(store) = self.snapshot().switchable(id).cloned() else {
            tracing::warn!(store_id = %id, "Cannot switch to inactive store");
            return false;
        };

        // The old loop may exit on its own during the check below, so
        // read the request before awaiting
        let monitor_requested = self.monitor_requested();

        tracing::info!(store = %store.name, "Switching store");
        self.dispatch(StoreAction::SelectStore(store.id.clone()));
        self.check_health(&store).await;
        self.dispatch(StoreAction::LoadingFinished);

        if monitor_requested {
            self.start_health_monitor();
        }

        true
    }

    /// Probe `{endpoint}/health` and record the result for `store`.
    ///
    /// Any non-OK response or transport failure reads as offline.
    pub async fn check_health(&self, store: &Store) -> ConnectionStatus {
        let api = ApiClient::for_store(self.inner.http.clone(), store);
        let start = std::time::Instant::now();

        let status = match api.health().await {
            Ok(health) => {
                let status = ConnectionStatus::from_health(&health);
                tracing::info!(
                    store = %store.name,
                    duration_ms = start.elapsed().as_millis() as u64,
                    database = %status.database,
                    processing = %status.processing,
                    "Health check succeeded"
                );
                status
            }
            Err(e) => {
                tracing::warn!(
                    store = %store.name,
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "Health check failed"
                );
                ConnectionStatus::offline()
            }
        };

        self.dispatch(StoreAction::HealthChecked {
            store_id: store.id.clone(),
            status: status.clone(),
            at: Utc::now(),
        });

        status
    }

    /// Check the selected store, if any
    pub async fn check_current_health(&self) -> Option<ConnectionStatus> {
        let store = self.current_store()?;
        Some(self.check_health(&store).await)
    }

    /// (Re)start periodic health checks for the selected store.
    ///
    /// Any previous monitor is cancelled. Returns `false` when no store is
    /// selected.
    pub fn start_health_monitor(&self) -> bool {
        let Some(store) = self.current_store() else {
            self.stop_health_monitor();
            return false;
        };

        let monitor = HealthMonitor::spawn(self.downgrade(), store, self.inner.health_interval);
        // Replacing drops the previous monitor, which cancels it
        *self.lock_monitor() = Some(monitor);
        true
    }

    /// Stop periodic health checks
    pub fn stop_health_monitor(&self) {
        if let Some(monitor) = self.lock_monitor().take() {
            monitor.cancel();
        }
    }

    /// Whether a monitor is currently running
    pub fn monitor_running(&self) -> bool {
        self.lock_monitor()
            .as_ref()
            .map(|monitor| monitor.is_running())
            .unwrap_or(false)
    }

    /// Whether monitoring was started and not stopped since
    fn monitor_requested(&self) -> bool {
        self.lock_monitor().is_some()
    }

    /// Store the running monitor checks, if any
    pub fn monitored_store(&self) -> Option<String> {
        self.lock_monitor()
            .as_ref()
            .filter(|monitor| monitor.is_running())
            .map(|monitor| monitor.store_id().to_string())
    }

    fn lock_monitor(&self) -> std::sync::MutexGuard<'_, Option<HealthMonitor>> {
        self.inner
            .monitor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn downgrade(&self) -> WeakStoreContext {
        WeakStoreContext {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl Default for StoreContext {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), DEFAULT_HEALTH_INTERVAL)
    }
}

impl std::fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreContext")
            .field("state", &*self.inner.state.borrow())
            .field("health_interval", &self.inner.health_interval)
            .finish()
    }
}
