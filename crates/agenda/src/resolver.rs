//! Calendar client resolution with transparent token refresh.

use chrono::{DateTime, Duration, Utc};
use database::{calendar_token, SqlitePool};
use gcal::{CalendarClient, OauthConfig};
use tracing::{debug, info};

use crate::error::{AgendaError, Result};

/// How close to expiry (seconds) an access token gets refreshed.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Whether a token expiring at `expires_at` should be refreshed at `now`.
///
/// True when the expiry is within the margin, inclusive, or already past.
pub fn should_refresh(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at - now <= Duration::seconds(REFRESH_MARGIN_SECS)
}

/// Produce an authenticated calendar handle for a client.
///
/// Loads the stored credentials, refreshes the access token when it is
/// about to expire, persists the refreshed token, and returns a handle
/// bound to the client's calendar (or "primary" if none was chosen).
///
/// The refresh write is conditional on the expiry we read; if a concurrent
/// request refreshed first, the write is skipped and this request proceeds
/// with the token it just obtained. The refresh token is never modified.
pub async fn resolve_calendar(
    pool: &SqlitePool,
    oauth: &OauthConfig,
    client_id: &str,
) -> Result<CalendarClient> {
    let token = calendar_token::get_token(pool, client_id)
        .await?
        .ok_or(AgendaError::NotConnected)?;

    let calendar_id = token.calendar_id_or_primary().to_string();

    if !should_refresh(token.expires_at, Utc::now()) {
        return Ok(CalendarClient::new(token.access_token, calendar_id));
    }

    let refreshed = oauth.refresh_access_token(&token.refresh_token).await?;
    let new_expiry = refreshed.expires_at();

    let stored = calendar_token::update_access_token(
        pool,
        client_id,
        &refreshed.access_token,
        new_expiry,
        token.expires_at,
    )
    .await?;

    if stored {
        info!(client_id, "Refreshed calendar access token");
    } else {
        // A concurrent refresher or a disconnect got there first. Either
        // way the token we hold is valid for this request.
        debug!(client_id, "Skipped persisting refresh; row changed underneath us");
    }

    Ok(CalendarClient::new(refreshed.access_token, calendar_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_boundary() {
        let now = Utc::now();

        // 59 seconds ahead: refresh.
        assert!(should_refresh(now + Duration::seconds(59), now));
        // Exactly at the margin: refresh (inclusive).
        assert!(should_refresh(now + Duration::seconds(60), now));
        // 61 seconds ahead: no refresh.
        assert!(!should_refresh(now + Duration::seconds(61), now));
    }

    #[test]
    fn test_expired_token_refreshes() {
        let now = Utc::now();
        assert!(should_refresh(now - Duration::hours(2), now));
        assert!(should_refresh(now, now));
    }
}
