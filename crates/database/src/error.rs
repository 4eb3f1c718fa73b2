use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfig(String),

    #[error("Database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Validation(#[from] core_types::ValidationError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("The requested record was not found.")]
    NotFound,

    #[error("Failed to process credential: {0}")]
    Credential(#[from] bcrypt::BcryptError),

    #[error("An error occurred during JSON serialization/deserialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database operation failed: {0}")]
    Store(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation => {
                    DbError::Conflict(format!("unique constraint violated: {db}"))
                }
                ErrorKind::ForeignKeyViolation => {
                    DbError::Conflict(format!("foreign key constraint violated: {db}"))
                }
                ErrorKind::NotNullViolation => {
                    DbError::Conflict(format!("not-null constraint violated: {db}"))
                }
                ErrorKind::CheckViolation => {
                    DbError::Conflict(format!("check constraint violated: {db}"))
                }
                _ => DbError::Store(e),
            },
            _ => DbError::Store(e),
        }
    }
}
