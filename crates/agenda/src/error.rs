//! Error types for calendar integration operations.

use thiserror::Error;

/// Errors that can occur during calendar integration operations.
#[derive(Debug, Error)]
pub enum AgendaError {
    /// The client has no stored calendar credentials.
    /// Remedy: connect the calendar.
    #[error("calendar not connected")]
    NotConnected,

    /// The refresh token was rejected by Google.
    /// Remedy: reconnect the calendar.
    #[error("calendar authorization expired; reconnect required")]
    AuthExpired,

    /// The client is missing something tool registration needs
    /// (API key, agent, webhook token). Operator-facing.
    #[error("client is missing {missing}")]
    Misconfigured { missing: &'static str },

    /// Persistence failure.
    #[error("database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Google API failure other than an auth rejection.
    #[error("Google API error: {0}")]
    Google(gcal::GcalError),

    /// Retell platform failure.
    #[error("Retell API error: {0}")]
    Retell(#[from] retell::RetellError),
}

impl From<gcal::GcalError> for AgendaError {
    fn from(err: gcal::GcalError) -> Self {
        match err {
            gcal::GcalError::AuthExpired => AgendaError::AuthExpired,
            other => AgendaError::Google(other),
        }
    }
}

/// Result type for calendar integration operations.
pub type Result<T> = std::result::Result<T, AgendaError>;
