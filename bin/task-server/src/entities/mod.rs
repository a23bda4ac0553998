//! Database abstraction layer.
//!
//! [`TaskStore`] defines the storage contract for tasks. The default
//! implementation is [`SqliteStore`]. To swap to another database, implement
//! [`TaskStore`] for your new type and change the concrete type in
//! [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required.
//!
//! # Migrations path
//!
//! `sqlx::migrate!("./migrations")` resolves the path at compile time relative
//! to `CARGO_MANIFEST_DIR`, so the directory is embedded into the binary.
//!
//! # Queries
//!
//! The `sqlx::query` (runtime-verified) form is used so that no
//! `DATABASE_URL` environment variable is needed at compile time.

pub mod dao;
pub mod task;

pub use dao::{NewTask, TaskRecord};
pub use task::TaskStore;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// SQLite-backed task store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://tasks.db?mode=rwc"` or `"sqlite::memory:"` for tests.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = if is_in_memory(url) {
            // Every connection to `:memory:` opens a distinct database, so the
            // pool must hold exactly one connection and never recycle it.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };
        let pool = options.connect(url).await?;
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Fresh, migrated in-memory store.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        Self::connect("sqlite::memory:", 1).await
    }

    /// Close every pooled connection. Later queries fail with `PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
