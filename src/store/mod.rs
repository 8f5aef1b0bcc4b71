//! Store Layer
//!
//! Owns the selected store, the store list and the coarse health signal.
//!
//! ```text
//! config.json ──► StoresConfig ──► StoreAction::ConfigLoaded ──► StoreState
//!                                                                    │
//!        switch_store / check_health / HealthMonitor ──► dispatch ───┘
//! ```

pub mod context;
pub mod health;
pub mod state;
pub mod types;

pub use context::StoreContext;
pub use health::{HealthMonitor, DEFAULT_HEALTH_INTERVAL};
pub use state::{StoreAction, StoreState, CONFIG_LOAD_ERROR};
pub use types::{
    ComponentStatus, ConnectionStatus, StatusLevel, Store, StoreSource, StoreStatus, StoresConfig,
};
