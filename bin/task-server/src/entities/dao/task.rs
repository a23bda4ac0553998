use chrono::{DateTime, Utc};

/// A row in the `tasks` table.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    /// Store-assigned identity; never changes once set.
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at`: tasks have no update path.
    pub updated_at: DateTime<Utc>,
}

/// A task that has not been persisted yet and therefore has no `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
