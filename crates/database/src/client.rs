//! Client record CRUD operations.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::Client;

const CLIENT_COLUMNS: &str = "id, name, email, retell_api_key, retell_agent_id, \
     webhook_token, created_at, updated_at";

/// Create a new client with a fresh UUID and no integrations configured.
pub async fn create_client(pool: &SqlitePool, name: &str, email: Option<&str>) -> Result<Client> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO clients (id, name, email)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(email)
    .execute(pool)
    .await?;

    get_client(pool, &id).await
}

/// Get a client by ID.
pub async fn get_client(pool: &SqlitePool, id: &str) -> Result<Client> {
    sqlx::query_as::<_, Client>(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Client",
        id: id.to_string(),
    })
}

/// List all clients, newest first.
pub async fn list_clients(pool: &SqlitePool) -> Result<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

/// Set or clear the client's Retell credentials.
pub async fn set_retell_credentials(
    pool: &SqlitePool,
    id: &str,
    api_key: Option<&str>,
    agent_id: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE clients
        SET retell_api_key = ?, retell_agent_id = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(api_key)
    .bind(agent_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Client",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Return the client's webhook token, generating and persisting one if absent.
pub async fn ensure_webhook_token(pool: &SqlitePool, id: &str) -> Result<String> {
    let client = get_client(pool, id).await?;
    if let Some(token) = client.webhook_token {
        return Ok(token);
    }

    rotate_webhook_token(pool, id).await
}

/// Replace the client's webhook token with a freshly generated one.
///
/// Invalidates any URLs previously registered with the voice platform.
pub async fn rotate_webhook_token(pool: &SqlitePool, id: &str) -> Result<String> {
    let token = Uuid::new_v4().simple().to_string();

    let result = sqlx::query(
        r#"
        UPDATE clients
        SET webhook_token = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&token)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Client",
            id: id.to_string(),
        });
    }

    Ok(token)
}

/// Resolve a webhook token to its owning client.
///
/// Unknown or revoked tokens resolve to `None`; this is the authorization
/// primitive for all inbound tool-invocation endpoints, so it never treats
/// a miss as an error.
pub async fn find_by_webhook_token(pool: &SqlitePool, token: &str) -> Result<Option<Client>> {
    let client = sqlx::query_as::<_, Client>(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients WHERE webhook_token = ?"
    ))
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(client)
}

/// Delete a client. Cascades to the calendar token row.
pub async fn delete_client(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM clients
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_webhook_token_lifecycle() {
        let db = test_db().await;
        let client = create_client(db.pool(), "Test", None).await.unwrap();

        // ensure generates once, then returns the same token
        let token = ensure_webhook_token(db.pool(), &client.id).await.unwrap();
        let again = ensure_webhook_token(db.pool(), &client.id).await.unwrap();
        assert_eq!(token, again);

        // rotate replaces it
        let rotated = rotate_webhook_token(db.pool(), &client.id).await.unwrap();
        assert_ne!(token, rotated);

        // old token no longer resolves, new one does
        let miss = find_by_webhook_token(db.pool(), &token).await.unwrap();
        assert!(miss.is_none());
        let hit = find_by_webhook_token(db.pool(), &rotated).await.unwrap();
        assert_eq!(hit.unwrap().id, client.id);
    }

    #[tokio::test]
    async fn test_unknown_webhook_token_resolves_to_none() {
        let db = test_db().await;
        let result = find_by_webhook_token(db.pool(), "no-such-token")
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
