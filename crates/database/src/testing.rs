//! Support for tests that want a real store without touching disk.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::connection::run_migrations;
use crate::error::DbError;

/// Creates a migrated, in-memory store.
///
/// The pool is pinned to a single immortal connection: an in-memory SQLite
/// database lives exactly as long as the connection that opened it, so a
/// second connection (or a recycled one) would see a fresh, empty database.
pub async fn memory_pool() -> Result<SqlitePool, DbError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}
