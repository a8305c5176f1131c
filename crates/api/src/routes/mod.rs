//! Route handlers for the API.

pub mod clients;
pub mod health;
pub mod oauth;
pub mod tools;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Operator surface: client records
        .route("/api/clients", post(clients::create_api).get(clients::list_api))
        .route("/api/clients/:id", get(clients::get_api))
        .route("/api/clients/:id/retell", put(clients::set_retell_api))
        .route(
            "/api/clients/:id/webhook-token",
            post(clients::rotate_webhook_token_api),
        )
        // Google OAuth lifecycle
        .route("/api/calendar/oauth/url", get(oauth::authorize_url_api))
        .route("/api/calendar/oauth/callback", get(oauth::callback_api))
        .route(
            "/api/calendar/connection/:client_id",
            delete(oauth::disconnect_api),
        )
        .route(
            "/api/calendar/connection/:client_id/calendar",
            put(oauth::set_calendar_api),
        )
        // Agent tool registration
        .route("/api/calendar/tools/register", post(tools::register_api))
        .route("/api/calendar/tools/unregister", post(tools::unregister_api))
        // Tool endpoints invoked by the voice platform
        .route("/api/calendar/tools/list-events", get(tools::list_events_api))
        .route("/api/calendar/tools/create-event", post(tools::create_event_api))
        .route("/api/calendar/tools/update-event", post(tools::update_event_api))
        .route("/api/calendar/tools/delete-event", post(tools::delete_event_api))
}
