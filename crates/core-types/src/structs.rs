use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::enums::Role;
use crate::error::ValidationError;

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn require_epoch_millis(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::InvalidValue(
            field,
            format!("negative timestamp {value}"),
        ));
    }
    Ok(())
}

/// Public projection of a user account. This shape never carries the secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

/// Full account record as submitted by the admin screen: the public fields
/// plus the plaintext secret. The secret only ever flows store-ward (hashed
/// on insert) and is ignored when the upsert takes the update branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub active: bool,
}

impl UserAccount {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("id", &self.id)?;
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("password", &self.password)?;
        if !self.email.contains('@') {
            return Err(ValidationError::InvalidValue(
                "email",
                format!("`{}` is not an email address", self.email),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A reusable checklist blueprint: a name plus an ordered list of item
/// labels. The order the caller submits is the order read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<String>,
}

impl ChecklistTemplate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("id", &self.id)?;
        require("name", &self.name)?;
        for item in &self.items {
            require("items", item)?;
        }
        Ok(())
    }
}

/// One entry of a task's live checklist. The id is assigned by the store on
/// insert and regenerated on every task upsert; it is text on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    pub checked: bool,
}

/// A scheduled patrol task and its owned checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub sector: String,
    pub ticket_id: Option<String>,
    pub description: Option<String>,
    pub responsible: String,
    /// Creation time in epoch milliseconds, assigned by the caller and
    /// immutable across upserts.
    pub created_at: i64,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
}

impl Task {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("id", &self.id)?;
        require("title", &self.title)?;
        require("sector", &self.sector)?;
        require("responsible", &self.responsible)?;
        require_epoch_millis("createdAt", self.created_at)?;
        for item in &self.checklist {
            require("checklist.label", &item.label)?;
        }
        Ok(())
    }
}

/// The record of one executed patrol round. Append-only: created once,
/// never updated. Carries a snapshot of the checklist state at completion
/// time rather than a reference to the task, so it stays meaningful after
/// the task is edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundLog {
    pub id: String,
    pub task_id: String,
    pub task_title: String,
    pub sector: String,
    pub ticket_id: Option<String>,
    pub responsible: String,
    pub start_time: i64,
    pub end_time: i64,
    pub duration_seconds: i64,
    pub observations: Option<String>,
    pub issues_detected: bool,
    pub ai_analysis: Option<String>,
    /// Base64-encoded signature image, if one was drawn.
    pub signature: Option<String>,
    pub validation_token: Option<String>,
    /// Opaque structured snapshot of the checklist at round completion.
    /// Absent on the wire means JSON `null`.
    #[serde(default)]
    pub checklist_state: JsonValue,
    /// Base64-encoded evidence photos.
    #[serde(default)]
    pub photos: Vec<String>,
}

impl RoundLog {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("id", &self.id)?;
        require("taskId", &self.task_id)?;
        require("taskTitle", &self.task_title)?;
        require("sector", &self.sector)?;
        require("responsible", &self.responsible)?;
        require_epoch_millis("startTime", self.start_time)?;
        require_epoch_millis("endTime", self.end_time)?;
        if self.duration_seconds < 0 {
            return Err(ValidationError::InvalidValue(
                "durationSeconds",
                format!("negative duration {}", self.duration_seconds),
            ));
        }
        Ok(())
    }
}

/// Tenant branding configuration, held in a single well-known row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    pub company_name: String,
    pub header_color: String,
    /// Base64-encoded logo image.
    pub logo: Option<String>,
}

impl SystemSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("companyName", &self.company_name)?;
        require("headerColor", &self.header_color)?;
        Ok(())
    }
}

impl Default for SystemSettings {
    /// The branding served before a tenant has saved anything.
    fn default() -> Self {
        Self {
            company_name: "RondaGuard".to_string(),
            header_color: "#203060".to_string(),
            logo: None,
        }
    }
}
