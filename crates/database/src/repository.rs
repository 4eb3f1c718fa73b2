use core_types::{ChecklistTemplate, RoundLog, SystemSettings, Task, User, UserAccount};
use sqlx::sqlite::SqlitePool;
use sqlx::{QueryBuilder, Sqlite};

use crate::error::DbError;
use crate::rows::{
    self, CredentialRow, RoundRow, SettingsRow, TaskChecklistItemRow, TaskRow, TemplateRow, UserRow,
};

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
///
/// Every multi-table write runs inside one transaction. A transaction that
/// is dropped before commit rolls back, so every early-return error path
/// releases its handle with no partial write left behind.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

/// The three ways a credential check can come out. Unknown email and wrong
/// secret are deliberately indistinguishable; a disabled account is not.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success(User),
    Inactive,
    InvalidCredentials,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ----- Users -----

    /// Fetches all user accounts in their public projection. The stored
    /// secret hash never leaves this crate.
    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, active FROM users ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    /// Inserts a user, or updates name, email, role, and active flag if the
    /// id is already taken. The submitted secret is hashed and stored only
    /// when the row is first created; an update leaves the existing hash
    /// untouched, so saving a user from the admin screen can never silently
    /// rotate their credential.
    #[tracing::instrument(skip(self, account), fields(user_id = %account.id))]
    pub async fn upsert_user(&self, account: &UserAccount) -> Result<(), DbError> {
        account.validate()?;
        let password_hash = bcrypt::hash(&account.password, bcrypt::DEFAULT_COST)?;

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, active) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                 name = excluded.name, \
                 email = excluded.email, \
                 role = excluded.role, \
                 active = excluded.active",
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&password_hash)
        .bind(account.role.as_str())
        .bind(rows::bool_to_int(account.active))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Flips a single account's active flag without touching anything else.
    /// Unlike the full upsert this addresses an existing row, so an unknown
    /// id is an error rather than an insert.
    #[tracing::instrument(skip(self))]
    pub async fn set_user_active(&self, id: &str, active: bool) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE users SET active = ? WHERE id = ?")
            .bind(rows::bool_to_int(active))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Checks a submitted credential: look the account up by email, verify
    /// the secret against the stored hash, then reject disabled accounts.
    /// A corrupt stored hash reads as a mismatch rather than an error.
    pub async fn verify_login(&self, email: &str, password: &str) -> Result<LoginOutcome, DbError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, name, email, password_hash, role, active FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(LoginOutcome::InvalidCredentials);
        };

        if !bcrypt::verify(password, &row.password_hash).unwrap_or(false) {
            return Ok(LoginOutcome::InvalidCredentials);
        }
        if !rows::int_to_bool(row.active) {
            return Ok(LoginOutcome::Inactive);
        }

        Ok(LoginOutcome::Success(row.into_user()?))
    }

    // ----- Checklist templates -----

    /// Fetches every template together with its ordered item labels. One
    /// follow-up query per template; template counts are small enough that
    /// the extra round trips are not worth batching away.
    pub async fn list_templates(&self) -> Result<Vec<ChecklistTemplate>, DbError> {
        let parents =
            sqlx::query_as::<_, TemplateRow>("SELECT id, name FROM checklist_templates ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        let mut templates = Vec::with_capacity(parents.len());
        for parent in parents {
            let items = sqlx::query_scalar::<_, String>(
                "SELECT item_label FROM checklist_template_items \
                 WHERE template_id = ? ORDER BY display_order",
            )
            .bind(&parent.id)
            .fetch_all(&self.pool)
            .await?;
            templates.push(parent.into_template(items));
        }

        Ok(templates)
    }

    /// Writes a template and its items as one unit. If the id exists the
    /// name is updated in place and the old item rows are dropped; either
    /// way the submitted items are inserted in one batch, numbered in
    /// submission order. Nothing is observable until the commit.
    #[tracing::instrument(skip(self, template), fields(template_id = %template.id))]
    pub async fn upsert_template(&self, template: &ChecklistTemplate) -> Result<(), DbError> {
        template.validate()?;

        let mut tx = self.pool.begin().await?;

        let existing =
            sqlx::query_scalar::<_, String>("SELECT id FROM checklist_templates WHERE id = ?")
                .bind(&template.id)
                .fetch_optional(&mut *tx)
                .await?;

        if existing.is_some() {
            sqlx::query("UPDATE checklist_templates SET name = ? WHERE id = ?")
                .bind(&template.name)
                .bind(&template.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM checklist_template_items WHERE template_id = ?")
                .bind(&template.id)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query("INSERT INTO checklist_templates (id, name) VALUES (?, ?)")
                .bind(&template.id)
                .bind(&template.name)
                .execute(&mut *tx)
                .await?;
        }

        if !template.items.is_empty() {
            let mut builder = QueryBuilder::<Sqlite>::new(
                "INSERT INTO checklist_template_items (template_id, item_label, display_order) ",
            );
            builder.push_values(
                template.items.iter().enumerate(),
                |mut row, (order, label)| {
                    row.push_bind(&template.id)
                        .push_bind(label)
                        .push_bind(order as i64);
                },
            );
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Removes a template; its item rows go with it. Idempotent.
    #[tracing::instrument(skip(self))]
    pub async fn delete_template(&self, id: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM checklist_templates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ----- Tasks -----

    /// Fetches all tasks, newest first, each with its live checklist
    /// attached. Checklist items come back in insertion order.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, DbError> {
        let parents = sqlx::query_as::<_, TaskRow>(
            "SELECT id, title, sector, ticket_id, description, responsible_name, created_at \
             FROM tasks ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut tasks = Vec::with_capacity(parents.len());
        for parent in parents {
            let items = sqlx::query_as::<_, TaskChecklistItemRow>(
                "SELECT id, label, is_checked FROM task_checklist_items \
                 WHERE task_id = ? ORDER BY id",
            )
            .bind(&parent.id)
            .fetch_all(&self.pool)
            .await?;

            let checklist = items
                .into_iter()
                .map(TaskChecklistItemRow::into_item)
                .collect();
            tasks.push(parent.into_task(checklist));
        }

        Ok(tasks)
    }

    /// Writes a task and its checklist as one unit. On update the scalar
    /// columns are rewritten except `created_at`, which keeps its original
    /// value for the life of the task, and the prior checklist rows are
    /// dropped wholesale. The submitted checklist is then inserted in one
    /// batch; the store assigns each item a fresh id.
    #[tracing::instrument(skip(self, task), fields(task_id = %task.id))]
    pub async fn upsert_task(&self, task: &Task) -> Result<(), DbError> {
        task.validate()?;

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, String>("SELECT id FROM tasks WHERE id = ?")
            .bind(&task.id)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            sqlx::query(
                "UPDATE tasks SET title = ?, sector = ?, ticket_id = ?, description = ?, \
                 responsible_name = ? WHERE id = ?",
            )
            .bind(&task.title)
            .bind(&task.sector)
            .bind(&task.ticket_id)
            .bind(&task.description)
            .bind(&task.responsible)
            .bind(&task.id)
            .execute(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM task_checklist_items WHERE task_id = ?")
                .bind(&task.id)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query(
                "INSERT INTO tasks (id, title, sector, ticket_id, description, \
                 responsible_name, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&task.id)
            .bind(&task.title)
            .bind(&task.sector)
            .bind(&task.ticket_id)
            .bind(&task.description)
            .bind(&task.responsible)
            .bind(task.created_at)
            .execute(&mut *tx)
            .await?;
        }

        if !task.checklist.is_empty() {
            let mut builder = QueryBuilder::<Sqlite>::new(
                "INSERT INTO task_checklist_items (task_id, label, is_checked) ",
            );
            builder.push_values(task.checklist.iter(), |mut row, item| {
                row.push_bind(&task.id)
                    .push_bind(&item.label)
                    .push_bind(rows::bool_to_int(item.checked));
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Removes a task and its checklist rows. Idempotent.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ----- Round logs -----

    /// Fetches the full round history, most recent start time first, with
    /// each round's evidence photos attached and its checklist snapshot
    /// parsed back into structured form.
    pub async fn list_rounds(&self) -> Result<Vec<RoundLog>, DbError> {
        let parents = sqlx::query_as::<_, RoundRow>(
            "SELECT id, task_id, task_title, sector, ticket_id, responsible_name, \
             start_time, end_time, duration_seconds, observations, issues_detected, \
             ai_analysis, signature_base64, validation_token, checklist_snapshot \
             FROM round_logs ORDER BY start_time DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut rounds = Vec::with_capacity(parents.len());
        for parent in parents {
            let photos = sqlx::query_scalar::<_, String>(
                "SELECT photo_base64 FROM round_evidence_photos WHERE round_id = ? ORDER BY id",
            )
            .bind(&parent.id)
            .fetch_all(&self.pool)
            .await?;
            rounds.push(parent.into_round(photos)?);
        }

        Ok(rounds)
    }

    /// Records a completed round and its evidence photos as one unit.
    /// Rounds are append-only: there is no update path, and a duplicate id
    /// aborts the whole write, photos included. The checklist state is
    /// snapshotted as JSON text so the round stays self-contained after
    /// the originating task changes or disappears.
    #[tracing::instrument(skip(self, round), fields(round_id = %round.id))]
    pub async fn insert_round(&self, round: &RoundLog) -> Result<(), DbError> {
        round.validate()?;
        let snapshot = rows::snapshot_to_text(&round.checklist_state)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO round_logs \
             (id, task_id, task_title, sector, ticket_id, responsible_name, start_time, \
              end_time, duration_seconds, observations, issues_detected, ai_analysis, \
              signature_base64, validation_token, checklist_snapshot) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&round.id)
        .bind(&round.task_id)
        .bind(&round.task_title)
        .bind(&round.sector)
        .bind(&round.ticket_id)
        .bind(&round.responsible)
        .bind(round.start_time)
        .bind(round.end_time)
        .bind(round.duration_seconds)
        .bind(&round.observations)
        .bind(rows::bool_to_int(round.issues_detected))
        .bind(&round.ai_analysis)
        .bind(&round.signature)
        .bind(&round.validation_token)
        .bind(&snapshot)
        .execute(&mut *tx)
        .await?;

        if !round.photos.is_empty() {
            let mut builder = QueryBuilder::<Sqlite>::new(
                "INSERT INTO round_evidence_photos (round_id, photo_base64) ",
            );
            builder.push_values(round.photos.iter(), |mut row, photo| {
                row.push_bind(&round.id).push_bind(photo);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // ----- System settings -----

    /// Reads the singleton branding row, falling back to the built-in
    /// defaults when no row has been saved yet.
    pub async fn get_settings(&self) -> Result<SystemSettings, DbError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT company_name, header_color, logo_base64 FROM system_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SettingsRow::into_settings).unwrap_or_default())
    }

    /// Writes the singleton branding row, creating it on first save and
    /// overwriting it afterwards.
    #[tracing::instrument(skip(self, settings))]
    pub async fn upsert_settings(&self, settings: &SystemSettings) -> Result<(), DbError> {
        settings.validate()?;

        sqlx::query(
            "INSERT INTO system_settings (id, company_name, header_color, logo_base64) \
             VALUES (1, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                 company_name = excluded.company_name, \
                 header_color = excluded.header_color, \
                 logo_base64 = excluded.logo_base64",
        )
        .bind(&settings.company_name)
        .bind(&settings.header_color)
        .bind(&settings.logo)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_pool;
    use core_types::{ChecklistItem, Role, ValidationError};
    use serde_json::{Value as JsonValue, json};

    async fn make_repo() -> DbRepository {
        let pool = memory_pool().await.expect("in-memory store");
        DbRepository::new(pool)
    }

    fn make_account(id: &str, email: &str, password: &str, active: bool) -> UserAccount {
        UserAccount {
            id: id.to_string(),
            name: format!("User {id}"),
            email: email.to_string(),
            password: password.to_string(),
            role: Role::Guard,
            active,
        }
    }

    fn make_template(id: &str, name: &str, items: &[&str]) -> ChecklistTemplate {
        ChecklistTemplate {
            id: id.to_string(),
            name: name.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn make_task(id: &str, created_at: i64, labels: &[(&str, bool)]) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            sector: "Warehouse".to_string(),
            ticket_id: Some("TK-1".to_string()),
            description: Some("Perimeter walk".to_string()),
            responsible: "Alex".to_string(),
            created_at,
            checklist: labels
                .iter()
                .map(|(label, checked)| ChecklistItem {
                    id: String::new(),
                    label: label.to_string(),
                    checked: *checked,
                })
                .collect(),
        }
    }

    fn make_round(id: &str, start_time: i64, photos: &[&str], state: JsonValue) -> RoundLog {
        RoundLog {
            id: id.to_string(),
            task_id: "t1".to_string(),
            task_title: "Night round".to_string(),
            sector: "Warehouse".to_string(),
            ticket_id: None,
            responsible: "Alex".to_string(),
            start_time,
            end_time: start_time + 60_000,
            duration_seconds: 60,
            observations: None,
            issues_detected: false,
            ai_analysis: None,
            signature: None,
            validation_token: Some("tok".to_string()),
            checklist_state: state,
            photos: photos.iter().map(|p| p.to_string()).collect(),
        }
    }

    async fn template_item_count(repo: &DbRepository, id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM checklist_template_items WHERE template_id = ?")
            .bind(id)
            .fetch_one(&repo.pool)
            .await
            .expect("count query")
    }

    #[tokio::test]
    async fn settings_fall_back_to_defaults_when_absent() {
        let repo = make_repo().await;

        let settings = repo.get_settings().await.expect("read settings");
        assert_eq!(settings.company_name, "RondaGuard");
        assert_eq!(settings.header_color, "#203060");
        assert_eq!(settings.logo, None);
    }

    #[tokio::test]
    async fn settings_upsert_overwrites_the_singleton() {
        let repo = make_repo().await;

        let first = SystemSettings {
            company_name: "Acme Security".to_string(),
            header_color: "#112233".to_string(),
            logo: None,
        };
        repo.upsert_settings(&first).await.expect("first save");

        let second = SystemSettings {
            company_name: "Acme Security".to_string(),
            header_color: "#445566".to_string(),
            logo: Some("aWNvbg==".to_string()),
        };
        repo.upsert_settings(&second).await.expect("second save");

        assert_eq!(repo.get_settings().await.expect("read"), second);
    }

    #[tokio::test]
    async fn template_items_come_back_in_submission_order() {
        let repo = make_repo().await;

        let template = make_template("tpl-1", "Perimeter", &["A", "B", "C"]);
        repo.upsert_template(&template).await.expect("upsert");

        let listed = repo.list_templates().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].items, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn template_update_replaces_the_whole_item_set() {
        let repo = make_repo().await;

        repo.upsert_template(&make_template("tpl-1", "Perimeter", &["A", "B", "C"]))
            .await
            .expect("first upsert");
        repo.upsert_template(&make_template("tpl-1", "Perimeter v2", &["Z"]))
            .await
            .expect("second upsert");

        let listed = repo.list_templates().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Perimeter v2");
        assert_eq!(listed[0].items, vec!["Z"]);
        assert_eq!(template_item_count(&repo, "tpl-1").await, 1);
    }

    #[tokio::test]
    async fn template_upsert_is_idempotent() {
        let repo = make_repo().await;
        let template = make_template("tpl-1", "Perimeter", &["A", "B", "C"]);

        repo.upsert_template(&template).await.expect("first upsert");
        repo.upsert_template(&template).await.expect("second upsert");

        let listed = repo.list_templates().await.expect("list");
        assert_eq!(listed, vec![template]);
        assert_eq!(template_item_count(&repo, "tpl-1").await, 3);
    }

    #[tokio::test]
    async fn deleting_a_template_removes_its_items_and_stays_quiet_on_repeat() {
        let repo = make_repo().await;

        repo.upsert_template(&make_template("tpl-1", "Perimeter", &["A", "B"]))
            .await
            .expect("upsert");
        repo.delete_template("tpl-1").await.expect("delete");

        assert!(repo.list_templates().await.expect("list").is_empty());
        assert_eq!(template_item_count(&repo, "tpl-1").await, 0);

        repo.delete_template("tpl-1").await.expect("repeat delete");
    }

    #[tokio::test]
    async fn task_round_trips_modulo_store_assigned_item_ids() {
        let repo = make_repo().await;

        let task = make_task("t1", 1_700_000_000_000, &[("Check gate", true), ("Lights", false)]);
        repo.upsert_task(&task).await.expect("upsert");

        let listed = repo.list_tasks().await.expect("list");
        assert_eq!(listed.len(), 1);
        let stored = &listed[0];

        assert_eq!(stored.id, task.id);
        assert_eq!(stored.title, task.title);
        assert_eq!(stored.sector, task.sector);
        assert_eq!(stored.ticket_id, task.ticket_id);
        assert_eq!(stored.description, task.description);
        assert_eq!(stored.responsible, task.responsible);
        assert_eq!(stored.created_at, task.created_at);

        let got: Vec<(&str, bool)> = stored
            .checklist
            .iter()
            .map(|i| (i.label.as_str(), i.checked))
            .collect();
        assert_eq!(got, vec![("Check gate", true), ("Lights", false)]);
        assert!(stored.checklist.iter().all(|i| !i.id.is_empty()));
    }

    #[tokio::test]
    async fn task_update_preserves_created_at_and_regenerates_items() {
        let repo = make_repo().await;

        repo.upsert_task(&make_task("t1", 1_000, &[("Old item", false)]))
            .await
            .expect("insert");
        let first_item_id = repo.list_tasks().await.expect("list")[0].checklist[0]
            .id
            .clone();

        let mut updated = make_task("t1", 9_999, &[("New item", true)]);
        updated.title = "Task t1 revised".to_string();
        repo.upsert_task(&updated).await.expect("update");

        let listed = repo.list_tasks().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Task t1 revised");
        // The original creation time wins over whatever the update carried.
        assert_eq!(listed[0].created_at, 1_000);
        assert_eq!(listed[0].checklist.len(), 1);
        assert_eq!(listed[0].checklist[0].label, "New item");
        assert!(listed[0].checklist[0].checked);
        // Replacement hands out a fresh store-assigned id.
        assert_ne!(listed[0].checklist[0].id, first_item_id);
    }

    #[tokio::test]
    async fn checked_flag_reads_true_for_any_nonzero_stored_value() {
        let repo = make_repo().await;

        repo.upsert_task(&make_task("t1", 1_000, &[("Check gate", true)]))
            .await
            .expect("upsert");

        // Simulate a loose historical writer that stored an arbitrary
        // truthy integer instead of 1.
        sqlx::query("UPDATE task_checklist_items SET is_checked = 7")
            .execute(&repo.pool)
            .await
            .expect("raw update");

        let listed = repo.list_tasks().await.expect("list");
        assert!(listed[0].checklist[0].checked);
    }

    #[tokio::test]
    async fn tasks_list_newest_first() {
        let repo = make_repo().await;

        repo.upsert_task(&make_task("t-old", 1_000, &[])).await.expect("old");
        repo.upsert_task(&make_task("t-new", 3_000, &[])).await.expect("new");
        repo.upsert_task(&make_task("t-mid", 2_000, &[])).await.expect("mid");

        let ids: Vec<String> = repo
            .list_tasks()
            .await
            .expect("list")
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["t-new", "t-mid", "t-old"]);
    }

    #[tokio::test]
    async fn round_scenario_keeps_photos_and_snapshot() {
        let repo = make_repo().await;

        let round = make_round("r1", 1_000, &["photo-a", "photo-b"], json!({"item1": true}));
        repo.insert_round(&round).await.expect("insert");

        let listed = repo.list_rounds().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].photos.len(), 2);
        assert_eq!(listed[0].checklist_state["item1"], json!(true));
    }

    #[tokio::test]
    async fn round_round_trips_including_null_snapshot() {
        let repo = make_repo().await;

        let round = make_round("r1", 1_000, &[], JsonValue::Null);
        repo.insert_round(&round).await.expect("insert");

        let listed = repo.list_rounds().await.expect("list");
        assert_eq!(listed, vec![round]);
    }

    #[tokio::test]
    async fn duplicate_round_id_rolls_back_and_leaves_prior_state_intact() {
        let repo = make_repo().await;

        let first = make_round("r1", 1_000, &["photo-a", "photo-b"], json!({"item1": true}));
        repo.insert_round(&first).await.expect("first insert");

        let replay = make_round("r1", 2_000, &["x", "y", "z"], json!({"item1": false}));
        let err = repo.insert_round(&replay).await.expect_err("duplicate id");
        assert!(matches!(err, DbError::Conflict(_)));

        let listed = repo.list_rounds().await.expect("list");
        assert_eq!(listed, vec![first]);
    }

    #[tokio::test]
    async fn rounds_list_by_start_time_descending() {
        let repo = make_repo().await;

        repo.insert_round(&make_round("r-old", 1_000, &[], JsonValue::Null))
            .await
            .expect("old");
        repo.insert_round(&make_round("r-new", 3_000, &[], JsonValue::Null))
            .await
            .expect("new");
        repo.insert_round(&make_round("r-mid", 2_000, &[], JsonValue::Null))
            .await
            .expect("mid");

        let ids: Vec<String> = repo
            .list_rounds()
            .await
            .expect("list")
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["r-new", "r-mid", "r-old"]);
    }

    #[tokio::test]
    async fn user_update_never_rotates_the_stored_secret() {
        let repo = make_repo().await;

        repo.upsert_user(&make_account("u1", "alex@example.com", "first-secret", true))
            .await
            .expect("insert");

        let mut resubmitted = make_account("u1", "alex@example.com", "second-secret", true);
        resubmitted.name = "Alex Renamed".to_string();
        repo.upsert_user(&resubmitted).await.expect("update");

        let users = repo.list_users().await.expect("list");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Alex Renamed");

        // The original secret still works; the resubmitted one never took.
        let outcome = repo
            .verify_login("alex@example.com", "first-secret")
            .await
            .expect("login");
        assert!(matches!(outcome, LoginOutcome::Success(ref u) if u.name == "Alex Renamed"));

        let outcome = repo
            .verify_login("alex@example.com", "second-secret")
            .await
            .expect("login");
        assert_eq!(outcome, LoginOutcome::InvalidCredentials);
    }

    #[tokio::test]
    async fn login_distinguishes_inactive_from_invalid() {
        let repo = make_repo().await;

        repo.upsert_user(&make_account("u1", "off@example.com", "secret", false))
            .await
            .expect("insert");

        let outcome = repo
            .verify_login("off@example.com", "secret")
            .await
            .expect("login");
        assert_eq!(outcome, LoginOutcome::Inactive);

        let outcome = repo
            .verify_login("off@example.com", "wrong")
            .await
            .expect("login");
        assert_eq!(outcome, LoginOutcome::InvalidCredentials);

        let outcome = repo
            .verify_login("nobody@example.com", "secret")
            .await
            .expect("login");
        assert_eq!(outcome, LoginOutcome::InvalidCredentials);
    }

    #[tokio::test]
    async fn set_user_active_updates_the_flag_and_rejects_unknown_ids() {
        let repo = make_repo().await;

        repo.upsert_user(&make_account("u1", "alex@example.com", "secret", true))
            .await
            .expect("insert");

        repo.set_user_active("u1", false).await.expect("deactivate");
        let users = repo.list_users().await.expect("list");
        assert!(!users[0].active);

        let err = repo
            .set_user_active("ghost", true)
            .await
            .expect_err("unknown id");
        assert!(matches!(err, DbError::NotFound));
    }

    #[tokio::test]
    async fn validation_failures_reject_before_any_write() {
        let repo = make_repo().await;

        let err = repo
            .upsert_template(&make_template("", "Nameless", &["A"]))
            .await
            .expect_err("blank id");
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::MissingField("id"))
        ));
        assert!(repo.list_templates().await.expect("list").is_empty());

        let err = repo
            .upsert_task(&make_task("t1", -5, &[]))
            .await
            .expect_err("negative timestamp");
        assert!(matches!(err, DbError::Validation(_)));
        assert!(repo.list_tasks().await.expect("list").is_empty());
    }
}
