//! Database models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A reseller client (one business using the AI call center).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Client {
    /// Client UUID.
    pub id: String,
    /// Business name.
    pub name: String,
    /// Contact email, if known.
    pub email: Option<String>,
    /// Retell platform API key for this client's account.
    pub retell_api_key: Option<String>,
    /// Retell agent handling this client's calls.
    pub retell_agent_id: Option<String>,
    /// Opaque capability token embedded in webhook URLs handed to Retell.
    pub webhook_token: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Stored Google OAuth credentials for a client. At most one row per client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CalendarToken {
    /// Owning client UUID.
    pub client_id: String,
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token, issued once at consent time.
    pub refresh_token: String,
    /// When the access token expires.
    pub expires_at: DateTime<Utc>,
    /// Calendar to operate against. `None` means the provider's "primary".
    pub calendar_id: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl CalendarToken {
    /// The calendar id to use with the Calendar API.
    pub fn calendar_id_or_primary(&self) -> &str {
        self.calendar_id.as_deref().unwrap_or("primary")
    }
}
