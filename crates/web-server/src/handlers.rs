use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, State},
};
use core_types::{
    ChecklistTemplate, LoginRequest, RoundLog, SystemSettings, Task, User, UserAccount,
};
use database::LoginOutcome;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;

/// Every write endpoint answers with the same small envelope.
fn success() -> Json<JsonValue> {
    Json(json!({ "success": true }))
}

/// # POST /api/login
/// Checks a credential pair and returns the account's public projection.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    let outcome = state
        .db_repo
        .verify_login(&credentials.email, &credentials.password)
        .await?;

    match outcome {
        LoginOutcome::Success(user) => Ok(Json(user)),
        LoginOutcome::Inactive => Err(AppError::UserInactive),
        LoginOutcome::InvalidCredentials => Err(AppError::InvalidCredentials),
    }
}

/// # GET /api/users
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, AppError> {
    let users = state.db_repo.list_users().await?;
    Ok(Json(users))
}

/// # POST /api/users
/// Creates or updates an account. The password only takes effect on create.
pub async fn save_user(
    State(state): State<Arc<AppState>>,
    Json(account): Json<UserAccount>,
) -> Result<Json<JsonValue>, AppError> {
    state.db_repo.upsert_user(&account).await?;
    Ok(success())
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub active: bool,
}

/// # PUT /api/users/:id/status
pub async fn set_user_status(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<JsonValue>, AppError> {
    state.db_repo.set_user_active(&id, update.active).await?;
    Ok(success())
}

/// # GET /api/templates
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChecklistTemplate>>, AppError> {
    let templates = state.db_repo.list_templates().await?;
    Ok(Json(templates))
}

/// # POST /api/templates
/// Creates or fully replaces a template and its ordered items.
pub async fn save_template(
    State(state): State<Arc<AppState>>,
    Json(template): Json<ChecklistTemplate>,
) -> Result<Json<JsonValue>, AppError> {
    state.db_repo.upsert_template(&template).await?;
    Ok(success())
}

/// # DELETE /api/templates/:id
pub async fn delete_template(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<JsonValue>, AppError> {
    state.db_repo.delete_template(&id).await?;
    Ok(success())
}

/// # GET /api/tasks
pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = state.db_repo.list_tasks().await?;
    Ok(Json(tasks))
}

/// # POST /api/tasks
/// Creates or fully replaces a task and its checklist.
pub async fn save_task(
    State(state): State<Arc<AppState>>,
    Json(task): Json<Task>,
) -> Result<Json<JsonValue>, AppError> {
    state.db_repo.upsert_task(&task).await?;
    Ok(success())
}

/// # DELETE /api/tasks/:id
pub async fn delete_task(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<JsonValue>, AppError> {
    state.db_repo.delete_task(&id).await?;
    Ok(success())
}

/// # GET /api/rounds
pub async fn list_rounds(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoundLog>>, AppError> {
    let rounds = state.db_repo.list_rounds().await?;
    Ok(Json(rounds))
}

/// # POST /api/rounds
/// Appends a completed round with its evidence photos.
pub async fn save_round(
    State(state): State<Arc<AppState>>,
    Json(round): Json<RoundLog>,
) -> Result<Json<JsonValue>, AppError> {
    state.db_repo.insert_round(&round).await?;
    Ok(success())
}

/// # GET /api/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SystemSettings>, AppError> {
    let settings = state.db_repo.get_settings().await?;
    Ok(Json(settings))
}

/// # POST /api/settings
pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<SystemSettings>,
) -> Result<Json<JsonValue>, AppError> {
    state.db_repo.upsert_settings(&settings).await?;
    Ok(success())
}
