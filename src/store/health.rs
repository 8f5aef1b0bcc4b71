//! Health Monitor
//!
//! Background task that re-checks the selected store's health on a fixed
//! interval. Dropping the monitor cancels it.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::context::WeakStoreContext;
use super::types::Store;

/// Default interval between health checks
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(300);

/// Periodic health checker bound to one store
pub struct HealthMonitor {
    store_id: String,
    token: CancellationToken,
    handle: JoinHandle<()>,
    _guard: DropGuard,
}

impl HealthMonitor {
    /// Spawn the monitor loop for `store`.
    ///
    /// The first tick is skipped since callers check health right before
    /// starting a monitor. The loop ends when cancelled, when the context is
    /// gone, or when a different store becomes current.
    pub(crate) fn spawn(ctx: WeakStoreContext, store: Store, interval: Duration) -> Self {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let store_id = store.id.clone();

        tracing::info!(
            store = %store.name,
            interval_secs = interval.as_secs(),
            "Starting health monitor"
        );

        // tokio intervals must be non-zero
        let interval = interval.max(Duration::from_millis(10));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let Some(ctx) = ctx.upgrade() else {
                    break;
                };
                if ctx.current_store().map(|s| s.id) != Some(store.id.clone()) {
                    tracing::debug!(store = %store.name, "Store no longer selected, stopping monitor");
                    break;
                }

                tracing::debug!(store = %store.name, "Running scheduled health check");
                ctx.check_health(&store).await;
            }

            tracing::debug!(store = %store.name, "Health monitor stopped");
        });

        Self {
            store_id,
            _guard: token.clone().drop_guard(),
            token,
            handle,
        }
    }

    /// Store this monitor checks
    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    /// Whether the loop is still alive
    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled() && !self.handle.is_finished()
    }

    /// Stop the loop
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("store_id", &self.store_id)
            .field("running", &self.is_running())
            .finish()
    }
}
