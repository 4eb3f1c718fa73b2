//! Row-level representations of stored records.
//!
//! The wire types in [`core_types`] speak camelCase JSON, booleans, and
//! structured checklist state. The tables underneath speak snake_case
//! columns, integer flags, and JSON held as text. This module owns the
//! translation in both directions so the repository never decodes columns
//! inline.

use core_types::{ChecklistItem, ChecklistTemplate, RoundLog, SystemSettings, Task, User};
use serde_json::Value as JsonValue;

use crate::error::DbError;

/// Integer flags are truthy when nonzero; only 0 reads back as false.
pub(crate) fn int_to_bool(v: i64) -> bool {
    v != 0
}

pub(crate) fn bool_to_int(v: bool) -> i64 {
    if v { 1 } else { 0 }
}

/// Serializes checklist state for the TEXT column. `Null` state is stored
/// as the literal `null` so reads reproduce it exactly.
pub(crate) fn snapshot_to_text(state: &JsonValue) -> Result<String, DbError> {
    Ok(serde_json::to_string(state)?)
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: i64,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role.parse()?,
            active: int_to_bool(self.active),
        })
    }
}

/// The only row shape that carries the stored secret hash. It exists for
/// the login check and is never handed past the repository boundary.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CredentialRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub active: i64,
}

impl CredentialRow {
    pub(crate) fn into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role.parse()?,
            active: int_to_bool(self.active),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TemplateRow {
    pub id: String,
    pub name: String,
}

impl TemplateRow {
    pub(crate) fn into_template(self, items: Vec<String>) -> ChecklistTemplate {
        ChecklistTemplate {
            id: self.id,
            name: self.name,
            items,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TaskRow {
    pub id: String,
    pub title: String,
    pub sector: String,
    pub ticket_id: Option<String>,
    pub description: Option<String>,
    pub responsible_name: String,
    pub created_at: i64,
}

impl TaskRow {
    pub(crate) fn into_task(self, checklist: Vec<ChecklistItem>) -> Task {
        Task {
            id: self.id,
            title: self.title,
            sector: self.sector,
            ticket_id: self.ticket_id,
            description: self.description,
            responsible: self.responsible_name,
            created_at: self.created_at,
            checklist,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TaskChecklistItemRow {
    pub id: i64,
    pub label: String,
    pub is_checked: i64,
}

impl TaskChecklistItemRow {
    /// Store-assigned item ids are integers in the table but text on the
    /// wire.
    pub(crate) fn into_item(self) -> ChecklistItem {
        ChecklistItem {
            id: self.id.to_string(),
            label: self.label,
            checked: int_to_bool(self.is_checked),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RoundRow {
    pub id: String,
    pub task_id: String,
    pub task_title: String,
    pub sector: String,
    pub ticket_id: Option<String>,
    pub responsible_name: String,
    pub start_time: i64,
    pub end_time: i64,
    pub duration_seconds: i64,
    pub observations: Option<String>,
    pub issues_detected: i64,
    pub ai_analysis: Option<String>,
    pub signature_base64: Option<String>,
    pub validation_token: Option<String>,
    pub checklist_snapshot: String,
}

impl RoundRow {
    pub(crate) fn into_round(self, photos: Vec<String>) -> Result<RoundLog, DbError> {
        let checklist_state: JsonValue = serde_json::from_str(&self.checklist_snapshot)?;
        Ok(RoundLog {
            id: self.id,
            task_id: self.task_id,
            task_title: self.task_title,
            sector: self.sector,
            ticket_id: self.ticket_id,
            responsible: self.responsible_name,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_seconds: self.duration_seconds,
            observations: self.observations,
            issues_detected: int_to_bool(self.issues_detected),
            ai_analysis: self.ai_analysis,
            signature: self.signature_base64,
            validation_token: self.validation_token,
            checklist_state,
            photos,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SettingsRow {
    pub company_name: String,
    pub header_color: String,
    pub logo_base64: Option<String>,
}

impl SettingsRow {
    pub(crate) fn into_settings(self) -> SystemSettings {
        SystemSettings {
            company_name: self.company_name,
            header_color: self.header_color,
            logo: self.logo_base64,
        }
    }
}
