//! Google OAuth connection lifecycle routes.

use axum::extract::{Path, Query, State};
use axum::Json;
use database::{calendar_token, client};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Query for the consent URL endpoint.
#[derive(Deserialize)]
pub struct AuthorizeUrlQuery {
    pub client_id: String,
}

/// Consent URL response.
#[derive(Serialize)]
pub struct AuthorizeUrlResponse {
    pub url: String,
}

/// Query Google sends to the OAuth callback.
#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    /// The client id, as placed in the consent URL's `state` parameter.
    pub state: String,
}

/// Generic acknowledgement body.
#[derive(Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

/// Build the Google consent URL for a client.
pub async fn authorize_url_api(
    State(state): State<AppState>,
    Query(query): Query<AuthorizeUrlQuery>,
) -> Result<Json<AuthorizeUrlResponse>> {
    // Fail early for unknown clients rather than after the consent dance.
    let record = client::get_client(state.db.pool(), &query.client_id).await?;

    let url = state.config.oauth.authorize_url(&record.id);
    Ok(Json(AuthorizeUrlResponse { url }))
}

/// OAuth callback: exchange the code and persist the client's credentials.
pub async fn callback_api(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<AckResponse>> {
    let record = client::get_client(state.db.pool(), &query.state).await?;

    let tokens = state.config.oauth.exchange_code(&query.code).await?;
    let refresh_token = tokens.refresh_token.clone().ok_or_else(|| {
        ApiError::BadRequest("Google did not return a refresh token; retry the consent flow".to_string())
    })?;

    calendar_token::upsert_token(
        state.db.pool(),
        &record.id,
        &tokens.access_token,
        &refresh_token,
        tokens.expires_at(),
    )
    .await?;

    info!(client_id = %record.id, "Calendar connected");
    Ok(Json(AckResponse {
        success: true,
        message: "Calendar connected".to_string(),
    }))
}

/// Request to choose which calendar events are managed on.
#[derive(Deserialize)]
pub struct SetCalendarRequest {
    /// `None` reverts to the primary calendar.
    pub calendar_id: Option<String>,
}

/// Point a connected client at a specific calendar instead of `primary`.
pub async fn set_calendar_api(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(req): Json<SetCalendarRequest>,
) -> Result<Json<AckResponse>> {
    if calendar_token::get_token(state.db.pool(), &client_id)
        .await?
        .is_none()
    {
        return Err(agenda::AgendaError::NotConnected.into());
    }

    calendar_token::set_calendar_id(state.db.pool(), &client_id, req.calendar_id.as_deref())
        .await?;

    info!(%client_id, "Calendar target updated");
    Ok(Json(AckResponse {
        success: true,
        message: "Calendar updated".to_string(),
    }))
}

/// Disconnect a client's calendar: the stored credentials are deleted.
pub async fn disconnect_api(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<AckResponse>> {
    calendar_token::delete_token(state.db.pool(), &client_id).await?;

    info!(%client_id, "Calendar disconnected");
    Ok(Json(AckResponse {
        success: true,
        message: "Calendar disconnected".to_string(),
    }))
}
