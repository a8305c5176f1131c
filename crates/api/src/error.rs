//! Error types for the API.

use agenda::AgendaError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur in API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Calendar integration failure.
    #[error(transparent)]
    Agenda(#[from] AgendaError),

    /// Database failure.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Google API failure.
    #[error(transparent)]
    Google(#[from] gcal::GcalError),

    /// The webhook token on an inbound tool call matched no client.
    #[error("unknown webhook token")]
    UnknownWebhookToken,

    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Agenda(AgendaError::NotConnected) => StatusCode::CONFLICT,
            ApiError::Agenda(AgendaError::AuthExpired) => StatusCode::UNAUTHORIZED,
            ApiError::Agenda(AgendaError::Misconfigured { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Agenda(AgendaError::Database(err)) => database_status(err),
            ApiError::Agenda(_) => StatusCode::BAD_GATEWAY,
            ApiError::Database(err) => database_status(err),
            ApiError::Google(gcal::GcalError::AuthExpired) => StatusCode::UNAUTHORIZED,
            ApiError::Google(_) => StatusCode::BAD_GATEWAY,
            ApiError::UnknownWebhookToken => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

fn database_status(err: &DatabaseError) -> StatusCode {
    match err {
        DatabaseError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        } else {
            tracing::warn!("Request rejected ({}): {}", status, message);
        }

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
