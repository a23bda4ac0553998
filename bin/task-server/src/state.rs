//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::services::TaskService;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Task operations backed by the SQLite store.
    pub tasks: TaskService<SqliteStore>,
}

impl AppState {
    pub fn new(config: Config, store: SqliteStore) -> Self {
        Self {
            config: Arc::new(config),
            tasks: TaskService::new(Arc::new(store)),
        }
    }
}
