use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("User is inactive.")]
    UserInactive,
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Caller mistakes (malformed records, identity conflicts, unknown ids) keep
/// their message; anything that points at the store itself is logged in full
/// and reported to the client as a generic internal error.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Database(DbError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Database(err @ DbError::Conflict(_)) => {
                tracing::warn!(error = %err, "Rejected conflicting write.");
                (StatusCode::CONFLICT, err.to_string())
            }
            AppError::Database(err @ DbError::NotFound) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::UserInactive => (StatusCode::FORBIDDEN, self.to_string()),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
