//! Page Models
//!
//! Each page has an explicit async load that fetches what it needs from
//! the selected store and builds a view model. Loads race a cancellation
//! token owned by the view, so a response arriving after the view is gone
//! is discarded instead of applied.
//!
//! Errors never escape a page: they become a fallback model plus a
//! warning in the log.

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiClient, ApiError, ApiResult};

pub mod analytics;
pub mod dashboard;
pub mod list;
pub mod person_details;
pub mod search;
pub mod session_details;

pub use analytics::{AnalyticsPage, AnalyticsParams, KeyMetrics};
pub use dashboard::{Dashboard, LiveSessions, MetricCard, RecentVisitors};
pub use list::{PagedList, PeopleList, PeopleSource, SessionList, SessionsSource};
pub use person_details::{PersonDetails, PersonSummary};
pub use search::SearchPage;
pub use session_details::{SessionDetails, SessionStats};

/// Result of loading a page
#[derive(Debug)]
pub enum PageOutcome<M> {
    /// Fetch succeeded
    Loaded(M),
    /// Fetch failed; `model` is the page's empty state
    Fallback { model: M, error: ApiError },
    /// The view went away before the fetch finished
    Cancelled,
}

impl<M> PageOutcome<M> {
    pub fn model(&self) -> Option<&M> {
        match self {
            PageOutcome::Loaded(model) | PageOutcome::Fallback { model, .. } => Some(model),
            PageOutcome::Cancelled => None,
        }
    }

    pub fn into_model(self) -> Option<M> {
        match self {
            PageOutcome::Loaded(model) | PageOutcome::Fallback { model, .. } => Some(model),
            PageOutcome::Cancelled => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            PageOutcome::Fallback { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, PageOutcome::Loaded(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PageOutcome::Cancelled)
    }

    pub fn map<N>(self, f: impl FnOnce(M) -> N) -> PageOutcome<N> {
        match self {
            PageOutcome::Loaded(model) => PageOutcome::Loaded(f(model)),
            PageOutcome::Fallback { model, error } => PageOutcome::Fallback {
                model: f(model),
                error,
            },
            PageOutcome::Cancelled => PageOutcome::Cancelled,
        }
    }
}

/// A page that loads once from its parameters
#[async_trait]
pub trait Page: Sized + Send + Serialize {
    /// Name used in logs
    const NAME: &'static str;

    /// What identifies the page, e.g. a route parameter
    type Params: Send + Sync;

    /// Fetch and build the model
    async fn fetch(api: &ApiClient, params: &Self::Params) -> ApiResult<Self>;

    /// Empty state shown when the fetch fails
    fn fallback(params: &Self::Params) -> Self;
}

/// Load page `P`, or return [`PageOutcome::Cancelled`] if `token` fires first
pub async fn load<P: Page>(
    api: &ApiClient,
    params: &P::Params,
    token: &CancellationToken,
) -> PageOutcome<P> {
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => None,
        result = P::fetch(api, params) => Some(result),
    };

    settle(P::NAME, api, token, result, || P::fallback(params))
}

/// Turn a finished (or abandoned) fetch into an outcome
pub(crate) fn settle<M>(
    page: &'static str,
    api: &ApiClient,
    token: &CancellationToken,
    result: Option<ApiResult<M>>,
    fallback: impl FnOnce() -> M,
) -> PageOutcome<M> {
    // A response racing the cancel still loses
    let Some(result) = result.filter(|_| !token.is_cancelled()) else {
        tracing::debug!(page, store = %api.store_name(), "Page load cancelled");
        return PageOutcome::Cancelled;
    };

    match result {
        Ok(model) => PageOutcome::Loaded(model),
        Err(error) => {
            tracing::warn!(
                page,
                store = %api.store_name(),
                error = %error,
                "Error loading page data, showing empty state"
            );
            PageOutcome::Fallback {
                model: fallback(),
                error,
            }
        }
    }
}
