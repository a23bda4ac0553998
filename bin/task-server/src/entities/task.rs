use crate::entities::{NewTask, SqliteStore, TaskRecord};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use std::future::Future;

/// Storage contract for tasks.
///
/// Keyword filters are case-insensitive substring matches (full Unicode case
/// folding, not just ASCII); `%`, `_` and `\` in a keyword match literally.
pub trait TaskStore: Send + Sync + 'static {
    /// Persist a new task and return it with its store-assigned id.
    fn insert_task(
        &self,
        task: NewTask,
    ) -> impl Future<Output = Result<TaskRecord, sqlx::Error>> + Send;
    fn get_task(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<TaskRecord>, sqlx::Error>> + Send;
    /// All tasks, in whatever order the store yields them.
    fn list_tasks(&self) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
    fn find_by_title_containing(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
    fn find_by_completed(
        &self,
        completed: bool,
    ) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
    /// Tasks created strictly after `timestamp`.
    fn find_by_created_after(
        &self,
        timestamp: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
    fn find_by_title_containing_and_completed(
        &self,
        keyword: &str,
        completed: bool,
    ) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
    /// Matches the keyword against either the title or the description.
    fn find_by_title_or_description_containing(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
    fn find_completed(&self) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
    /// Combined filter where `None` leaves that field unconstrained.
    fn search_tasks(
        &self,
        keyword: Option<&str>,
        completed: Option<bool>,
    ) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
    /// Round-trip to the backing database.
    fn ping(&self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

type TaskRow = (i64, String, Option<String>, bool, String, String);

const SELECT_TASKS: &str =
    "SELECT id, title, description, completed, created_at, updated_at FROM tasks";

impl TaskStore for SqliteStore {
    async fn insert_task(&self, task: NewTask) -> Result<TaskRecord, sqlx::Error> {
        // Stored precision is microseconds; hand back exactly what was stored.
        let created_at = task.created_at.trunc_subsecs(6);
        let updated_at = task.updated_at.trunc_subsecs(6);
        let result = sqlx::query(
            "INSERT INTO tasks \
             (title, description, completed, created_at, updated_at, title_lower, description_lower) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(format_timestamp(created_at))
        .bind(format_timestamp(updated_at))
        .bind(task.title.to_lowercase())
        .bind(task.description.as_deref().map(str::to_lowercase))
        .execute(&self.pool)
        .await?;
        Ok(TaskRecord {
            id: result.last_insert_rowid(),
            title: task.title,
            description: task.description,
            completed: task.completed,
            created_at,
            updated_at,
        })
    }

    async fn get_task(&self, id: i64) -> Result<Option<TaskRecord>, sqlx::Error> {
        let row: Option<TaskRow> = sqlx::query_as(&format!("{SELECT_TASKS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(into_record))
    }

    async fn list_tasks(&self) -> Result<Vec<TaskRecord>, sqlx::Error> {
        let rows: Vec<TaskRow> = sqlx::query_as(SELECT_TASKS).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(into_record).collect())
    }

    async fn find_by_title_containing(&self, keyword: &str) -> Result<Vec<TaskRecord>, sqlx::Error> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "{SELECT_TASKS} WHERE title_lower LIKE ?1 ESCAPE '\\'"
        ))
        .bind(contains_pattern(keyword))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(into_record).collect())
    }

    async fn find_by_completed(&self, completed: bool) -> Result<Vec<TaskRecord>, sqlx::Error> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!("{SELECT_TASKS} WHERE completed = ?1"))
            .bind(completed)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(into_record).collect())
    }

    async fn find_by_created_after(
        &self,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<TaskRecord>, sqlx::Error> {
        // Fixed-width UTC text compares in chronological order.
        let rows: Vec<TaskRow> = sqlx::query_as(&format!("{SELECT_TASKS} WHERE created_at > ?1"))
            .bind(format_timestamp(timestamp))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(into_record).collect())
    }

    async fn find_by_title_containing_and_completed(
        &self,
        keyword: &str,
        completed: bool,
    ) -> Result<Vec<TaskRecord>, sqlx::Error> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "{SELECT_TASKS} WHERE title_lower LIKE ?1 ESCAPE '\\' AND completed = ?2"
        ))
        .bind(contains_pattern(keyword))
        .bind(completed)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(into_record).collect())
    }

    async fn find_by_title_or_description_containing(
        &self,
        keyword: &str,
    ) -> Result<Vec<TaskRecord>, sqlx::Error> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "{SELECT_TASKS} WHERE title_lower LIKE ?1 ESCAPE '\\' \
             OR description_lower LIKE ?1 ESCAPE '\\'"
        ))
        .bind(contains_pattern(keyword))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(into_record).collect())
    }

    async fn find_completed(&self) -> Result<Vec<TaskRecord>, sqlx::Error> {
        self.find_by_completed(true).await
    }

    async fn search_tasks(
        &self,
        keyword: Option<&str>,
        completed: Option<bool>,
    ) -> Result<Vec<TaskRecord>, sqlx::Error> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "{SELECT_TASKS} WHERE (?1 IS NULL OR title_lower LIKE ?1 ESCAPE '\\') \
             AND (?2 IS NULL OR completed = ?2)"
        ))
        .bind(keyword.map(contains_pattern))
        .bind(completed)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(into_record).collect())
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// ── row helpers ───────────────────────────────────────────────────────────────

fn into_record(
    (id, title, description, completed, created_at, updated_at): TaskRow,
) -> TaskRecord {
    TaskRecord {
        id,
        title,
        description,
        completed,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    }
}

/// `YYYY-MM-DDTHH:MM:SS.ffffffZ`, always the same width.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        tracing::warn!(raw = %raw, error = %e, "failed to parse task timestamp; using now");
        Utc::now()
    })
}

/// Lowercased `LIKE` pattern matching `keyword` anywhere, with metacharacters
/// escaped. Compared against the `*_lower` columns.
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
