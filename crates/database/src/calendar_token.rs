//! Calendar token store operations.
//!
//! One row per client, created on OAuth consent, mutated on every access
//! token refresh, deleted on disconnect.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::CalendarToken;

const TOKEN_COLUMNS: &str = "client_id, access_token, refresh_token, expires_at, \
     calendar_id, created_at, updated_at";

/// Insert or replace the client's stored credentials.
///
/// Called from the OAuth callback. A re-consent replaces the access and
/// refresh tokens but keeps any previously chosen calendar id.
pub async fn upsert_token(
    pool: &SqlitePool,
    client_id: &str,
    access_token: &str,
    refresh_token: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO calendar_tokens (client_id, access_token, refresh_token, expires_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(client_id) DO UPDATE SET
            access_token = excluded.access_token,
            refresh_token = excluded.refresh_token,
            expires_at = excluded.expires_at,
            updated_at = datetime('now')
        "#,
    )
    .bind(client_id)
    .bind(access_token)
    .bind(refresh_token)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the stored credentials for a client, if connected.
pub async fn get_token(pool: &SqlitePool, client_id: &str) -> Result<Option<CalendarToken>> {
    let token = sqlx::query_as::<_, CalendarToken>(&format!(
        "SELECT {TOKEN_COLUMNS} FROM calendar_tokens WHERE client_id = ?"
    ))
    .bind(client_id)
    .fetch_optional(pool)
    .await?;

    Ok(token)
}

/// Persist a refreshed access token, leaving the refresh token untouched.
///
/// The update is conditional on `expires_at` still holding the value the
/// caller read, so two concurrent refreshers converge instead of clobbering
/// each other. Returns `false` when the row changed (or vanished) underneath
/// us; the caller keeps its in-memory token and moves on.
pub async fn update_access_token(
    pool: &SqlitePool,
    client_id: &str,
    access_token: &str,
    expires_at: DateTime<Utc>,
    seen_expires_at: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE calendar_tokens
        SET access_token = ?, expires_at = ?, updated_at = datetime('now')
        WHERE client_id = ? AND expires_at = ?
        "#,
    )
    .bind(access_token)
    .bind(expires_at)
    .bind(client_id)
    .bind(seen_expires_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Set which calendar the client's events are managed on.
pub async fn set_calendar_id(
    pool: &SqlitePool,
    client_id: &str,
    calendar_id: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE calendar_tokens
        SET calendar_id = ?, updated_at = datetime('now')
        WHERE client_id = ?
        "#,
    )
    .bind(calendar_id)
    .bind(client_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete the client's credentials (explicit disconnect).
pub async fn delete_token(pool: &SqlitePool, client_id: &str) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM calendar_tokens
        WHERE client_id = ?
        "#,
    )
    .bind(client_id)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client, Database};
    use chrono::Duration;

    async fn test_db() -> (Database, String) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let c = client::create_client(db.pool(), "Test", None).await.unwrap();
        let id = c.id;
        (db, id)
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_client() {
        let (db, id) = test_db().await;
        let expiry = Utc::now() + Duration::hours(1);

        upsert_token(db.pool(), &id, "at_1", "rt_1", expiry).await.unwrap();
        upsert_token(db.pool(), &id, "at_2", "rt_2", expiry).await.unwrap();

        let token = get_token(db.pool(), &id).await.unwrap().unwrap();
        assert_eq!(token.access_token, "at_2");
        assert_eq!(token.refresh_token, "rt_2");
        assert_eq!(token.calendar_id_or_primary(), "primary");
    }

    #[tokio::test]
    async fn test_refresh_persists_access_token_only() {
        let (db, id) = test_db().await;
        let expiry = Utc::now() + Duration::seconds(30);
        upsert_token(db.pool(), &id, "old_access", "the_refresh", expiry)
            .await
            .unwrap();

        let seen = get_token(db.pool(), &id).await.unwrap().unwrap();
        let new_expiry = Utc::now() + Duration::hours(1);
        let updated = update_access_token(db.pool(), &id, "new_access", new_expiry, seen.expires_at)
            .await
            .unwrap();
        assert!(updated);

        let token = get_token(db.pool(), &id).await.unwrap().unwrap();
        assert_eq!(token.access_token, "new_access");
        assert_eq!(token.refresh_token, "the_refresh");
        assert_eq!(token.expires_at, new_expiry);
    }

    #[tokio::test]
    async fn test_concurrent_refreshers_converge() {
        let (db, id) = test_db().await;
        let expiry = Utc::now() + Duration::seconds(30);
        upsert_token(db.pool(), &id, "old", "rt", expiry).await.unwrap();
        let seen = get_token(db.pool(), &id).await.unwrap().unwrap();

        // First refresher wins.
        let first_expiry = Utc::now() + Duration::hours(1);
        assert!(
            update_access_token(db.pool(), &id, "first", first_expiry, seen.expires_at)
                .await
                .unwrap()
        );

        // Second refresher read the same row but loses the conditional write.
        let second_expiry = Utc::now() + Duration::hours(1) + Duration::seconds(5);
        assert!(
            !update_access_token(db.pool(), &id, "second", second_expiry, seen.expires_at)
                .await
                .unwrap()
        );

        let token = get_token(db.pool(), &id).await.unwrap().unwrap();
        assert_eq!(token.access_token, "first");
    }

    #[tokio::test]
    async fn test_set_calendar_id_switches_target() {
        let (db, id) = test_db().await;
        upsert_token(db.pool(), &id, "at", "rt", Utc::now()).await.unwrap();

        set_calendar_id(db.pool(), &id, Some("agenda@example.com"))
            .await
            .unwrap();
        let token = get_token(db.pool(), &id).await.unwrap().unwrap();
        assert_eq!(token.calendar_id_or_primary(), "agenda@example.com");

        // Clearing it falls back to the primary calendar.
        set_calendar_id(db.pool(), &id, None).await.unwrap();
        let token = get_token(db.pool(), &id).await.unwrap().unwrap();
        assert_eq!(token.calendar_id_or_primary(), "primary");
    }

    #[tokio::test]
    async fn test_disconnect_deletes_row() {
        let (db, id) = test_db().await;
        upsert_token(db.pool(), &id, "at", "rt", Utc::now()).await.unwrap();

        delete_token(db.pool(), &id).await.unwrap();
        assert!(get_token(db.pool(), &id).await.unwrap().is_none());

        // A late refresh write after disconnect is a no-op.
        let updated = update_access_token(db.pool(), &id, "late", Utc::now(), Utc::now())
            .await
            .unwrap();
        assert!(!updated);
    }
}
