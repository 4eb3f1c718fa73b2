use crate::error::DbError;
use dotenvy::dotenv;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Bounds for the connection pool, decided once at startup and passed in
/// explicitly. The pool is a process-scoped resource, never ambient state.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Upper bound on simultaneously open store connections.
    pub max_connections: u32,
    /// How long a queued request waits for a free handle before failing.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Establishes a bounded connection pool to the SQLite database.
///
/// This function reads the `DATABASE_URL` from the environment (honoring a
/// `.env` file when present), creates a connection pool with robust
/// settings, and returns it. This pool can be shared across the entire
/// application; requests beyond the bound queue for a free handle rather
/// than failing immediately.
pub async fn connect(settings: &PoolSettings) -> Result<SqlitePool, DbError> {
    // Load environment variables from the .env file, if one exists.
    dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfig("DATABASE_URL must be set.".to_string()))?;

    let options = SqliteConnectOptions::from_str(&database_url)
        .map_err(|e| DbError::ConnectionConfig(format!("invalid DATABASE_URL: {e}")))?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(options)
        .await?;

    tracing::debug!(
        max_connections = settings.max_connections,
        "database pool created"
    );
    Ok(pool)
}

/// A utility function to run database migrations automatically.
///
/// This is useful for ensuring the database schema is up-to-date when the application starts,
/// which is especially important in production deployments.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
