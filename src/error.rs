//! Error types for backend calls.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur while talking to the knowledge-base backend.
///
/// The UI never distinguishes between variants: every one of them collapses
/// to the same generic banner. The variants exist for logging.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, malformed response body, ...
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("Backend returned status {0}")]
    Status(StatusCode),

    /// The background task running the request panicked or was cancelled.
    #[error("Request task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Task(err.to_string())
    }
}
