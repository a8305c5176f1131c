//! Error types for Google API operations.

use thiserror::Error;

/// Errors that can occur talking to Google.
#[derive(Debug, Error)]
pub enum GcalError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The refresh token was rejected, or an API call came back 401.
    /// The user has to reconnect their calendar.
    #[error("Google authorization expired or revoked")]
    AuthExpired,

    /// Non-success response from a Google API.
    #[error("Google API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Unexpected response body.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for Google API operations.
pub type Result<T> = std::result::Result<T, GcalError>;
