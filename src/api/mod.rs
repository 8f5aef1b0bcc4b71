//! Store Backend API
//!
//! Typed access to a store's REST backend.
//!
//! # Endpoints
//!
//! - `GET /health` - Component status
//! - `GET /overall_analytics` - Store-wide totals
//! - `GET /sessions?limit&offset` - Paged sessions
//! - `GET /sessions/{name}` - Session details
//! - `GET /persons?limit&offset` - Paged persons
//! - `GET /persons/{id}` - Person details
//! - `GET /business_analytics[?date=YYYY-MM-DD]` - Daily visit records
//!
//! ## Legacy
//! - `GET /system/stats`, `GET /daily/metrics`, `POST /search`
//!
//! # Example
//!
//! ```rust,no_run
//! use faceboard::api::ApiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = ApiClient::new(reqwest::Client::new(), "http://localhost:8000", "Main St");
//!     let page = api.get_sessions(20, 0).await?;
//!     println!("{} sessions", page.sessions.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod dto;
pub mod error;
pub mod search;

pub use client::{ApiClient, HEALTH_TIMEOUT};
pub use dto::{
    BusinessAnalytics, BusinessAnalyticsRecord, CombinedMetrics, DailyMetrics, FaceMetadata,
    Gender, HealthResponse, OverallAnalytics, Pagination, Person, PersonsResponse,
    QualityMetrics, Session, SessionInfo, SessionsResponse, SystemStats, ViewStatistics,
};
pub use error::{ApiError, ApiResult};
pub use search::{search_data, percent, ResultKind, SearchResponse, SearchResult, SearchType};
