//! SQLite persistence layer for Centralita.
//!
//! This crate provides async database operations for client records and
//! per-client Google Calendar credentials using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{client, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:centralita.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let new_client = client::create_client(db.pool(), "Clínica Sonrisa", None).await?;
//!     println!("created {}", new_client.id);
//!
//!     Ok(())
//! }
//! ```

pub mod calendar_token;
pub mod client;
pub mod error;
pub mod models;

pub use error::{DatabaseError, Result};
pub use models::{CalendarToken, Client};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

// Re-exported so dependent crates can take `&SqlitePool` without their own
// sqlx dependency.
pub use sqlx::SqlitePool;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist, or
    /// `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_client_crud() {
        let db = test_db().await;

        // Create
        let created = client::create_client(db.pool(), "Clínica Sonrisa", Some("info@sonrisa.mx"))
            .await
            .unwrap();
        assert!(!created.id.is_empty());
        assert!(created.webhook_token.is_none());

        // Read
        let fetched = client::get_client(db.pool(), &created.id).await.unwrap();
        assert_eq!(fetched.name, "Clínica Sonrisa");

        // Update Retell credentials
        client::set_retell_credentials(db.pool(), &created.id, Some("sk_test"), Some("ag_1"))
            .await
            .unwrap();
        let fetched = client::get_client(db.pool(), &created.id).await.unwrap();
        assert_eq!(fetched.retell_api_key.as_deref(), Some("sk_test"));
        assert_eq!(fetched.retell_agent_id.as_deref(), Some("ag_1"));

        // List
        let clients = client::list_clients(db.pool()).await.unwrap();
        assert_eq!(clients.len(), 1);

        // Delete
        client::delete_client(db.pool(), &created.id).await.unwrap();
        let result = client::get_client(db.pool(), &created.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
