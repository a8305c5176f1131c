//! Error types for Retell API operations.

use thiserror::Error;

/// Errors that can occur talking to the Retell platform.
#[derive(Debug, Error)]
pub enum RetellError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the platform.
    #[error("Retell API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Unexpected response body.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for Retell API operations.
pub type Result<T> = std::result::Result<T, RetellError>;
