//! # Faceboard
//!
//! Store-aware client and view models for a facial-recognition analytics
//! dashboard: sessions, visitors, quality metrics and business analytics,
//! fetched from one REST backend per store.
//!
//! ## Modules
//!
//! - [`store`]: Store selection, health checks and the shared state container
//! - [`api`]: Typed client for a store backend
//! - [`pages`]: Cancellable page loads and their view models
//! - [`analytics`]: Client-side reductions over business-analytics records
//! - [`render`]: Plain-text views for the CLI
//! - [`time`]: Relative and absolute timestamp formatting
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use faceboard::pages::SessionList;
//! use faceboard::store::{StoreContext, StoreSource};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = StoreContext::default();
//!     ctx.load_config(&StoreSource::from("./config.json")).await?;
//!
//!     // Keep the status indicators fresh while the view is open
//!     ctx.start_health_monitor();
//!
//!     let view = CancellationToken::new();
//!     let mut sessions = SessionList::default();
//!     sessions.refresh(&ctx.api()?, &view).await;
//!
//!     println!("{} sessions", sessions.items().len());
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod config;
pub mod pages;
pub mod render;
pub mod store;
pub mod time;

// Re-export top-level types for convenience
pub use api::{ApiClient, ApiError, ApiResult, SearchType};

pub use config::{Config, ConfigError, LoadedConfig, LoggingConfig};

pub use pages::{Page, PageOutcome};

pub use store::{
    ConnectionStatus, Store, StoreAction, StoreContext, StoreSource, StoreState, StoresConfig,
};
