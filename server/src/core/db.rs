//! Database bootstrap - pool creation and schema migrations

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

/// Opens a pool on a SQLite URL, creating the database file if missing.
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    debug!("Connecting to {}", database_url);
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    info!("Database pool ready ({} max connections)", max_connections);
    Ok(pool)
}

/// Private in-memory database already migrated.
///
/// Every connection to `sqlite::memory:` sees its own database, so the pool is pinned to a
/// single connection that is never recycled.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Applies the migrations under `server/migrations`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Migrations applied");
    Ok(())
}
