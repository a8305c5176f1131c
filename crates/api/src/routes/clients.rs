//! Client record routes (operator surface).

use axum::extract::{Path, State};
use axum::Json;
use database::{client, Client};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Request to create a client.
#[derive(Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: Option<String>,
}

/// Request to set a client's Retell credentials.
#[derive(Deserialize)]
pub struct SetRetellRequest {
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
}

/// Response carrying a freshly rotated webhook token.
#[derive(Serialize)]
pub struct WebhookTokenResponse {
    pub webhook_token: String,
}

/// Create a new client.
pub async fn create_api(
    State(state): State<AppState>,
    Json(req): Json<CreateClientRequest>,
) -> Result<Json<Client>> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }

    let created =
        client::create_client(state.db.pool(), req.name.trim(), req.email.as_deref()).await?;
    Ok(Json(created))
}

/// List all clients.
pub async fn list_api(State(state): State<AppState>) -> Result<Json<Vec<Client>>> {
    let clients = client::list_clients(state.db.pool()).await?;
    Ok(Json(clients))
}

/// Get a client by id.
pub async fn get_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Client>> {
    let found = client::get_client(state.db.pool(), &id).await?;
    Ok(Json(found))
}

/// Set or clear a client's Retell credentials.
pub async fn set_retell_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetRetellRequest>,
) -> Result<Json<Client>> {
    client::set_retell_credentials(
        state.db.pool(),
        &id,
        req.api_key.as_deref(),
        req.agent_id.as_deref(),
    )
    .await?;

    // Tool registration needs a webhook token; mint one as soon as the
    // agent is wired up so the register call can't fail on it.
    if req.api_key.is_some() && req.agent_id.is_some() {
        client::ensure_webhook_token(state.db.pool(), &id).await?;
    }

    let updated = client::get_client(state.db.pool(), &id).await?;
    Ok(Json(updated))
}

/// Rotate the client's webhook token.
///
/// Tool URLs registered with the old token stop resolving immediately;
/// re-register the tools afterwards.
pub async fn rotate_webhook_token_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WebhookTokenResponse>> {
    let webhook_token = client::rotate_webhook_token(state.db.pool(), &id).await?;
    Ok(Json(WebhookTokenResponse { webhook_token }))
}
