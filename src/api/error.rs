//! API Error Types
//!
//! Errors surfaced by the store backend client. Pages catch these at their
//! boundary and fall back to an empty model; nothing here is retried.

use thiserror::Error;

/// Errors that can occur when talking to a store backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// No store is selected, so there is no base URL to call
    #[error("No store selected")]
    NoStoreSelected,

    /// Backend answered with a non-2xx status
    #[error("API call failed: {status} ({url})")]
    Http { status: u16, url: String },

    /// Request did not complete in time
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Connection or other transport failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(url.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err)
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Result type for backend calls
pub type ApiResult<T> = Result<T, ApiError>;
