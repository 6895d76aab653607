use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::debug;

use crate::migrations;

pub type DbPool = sqlx::SqlitePool;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(database_url, DEFAULT_MAX_CONNECTIONS, DEFAULT_TIMEOUT_SECS).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    debug!(
        event_name = "system.database.connect",
        max_connections,
        timeout_secs,
        "opening sqlite pool"
    );

    // Comment ownership relies on the product_comment foreign key, which SQLite
    // only enforces per connection.
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

/// Single-connection in-memory pool with the schema applied. Every call gets
/// an isolated database.
pub async fn connect_in_memory() -> Result<DbPool, sqlx::Error> {
    let pool = connect_with_settings("sqlite::memory:", 1, DEFAULT_TIMEOUT_SECS).await?;
    migrations::run_pending(&pool).await?;
    Ok(pool)
}
