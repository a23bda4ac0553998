//! Task service: shape conversion between the HTTP layer and [`TaskStore`].
//!
//! Every operation is a single store round-trip. Not-found is the only
//! condition raised here; storage failures propagate unchanged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::entities::{NewTask, TaskRecord, TaskStore};
use crate::error::ServerError;
use crate::schemas::task::{TaskRequest, TaskResponse};

#[derive(Debug)]
pub struct TaskService<S> {
    store: Arc<S>,
}

impl<S> Clone for TaskService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: TaskStore> TaskService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[cfg(test)]
    fn store(&self) -> &S {
        &self.store
    }

    /// Whether the backing store currently answers queries.
    pub async fn check_store(&self) -> Result<(), ServerError> {
        self.store.ping().await?;
        Ok(())
    }

    /// Persist a new, not yet completed task stamped with the current time.
    pub async fn create_task(&self, request: TaskRequest) -> Result<TaskResponse, ServerError> {
        let now = Utc::now();
        let record = self
            .store
            .insert_task(NewTask {
                title: request.title,
                description: request.description,
                completed: false,
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!(task_id = record.id, "task created");
        Ok(record.to_response())
    }

    pub async fn get_all_tasks(&self) -> Result<Vec<TaskResponse>, ServerError> {
        Ok(to_responses(self.store.list_tasks().await?))
    }

    pub async fn get_task_by_id(&self, id: i64) -> Result<TaskResponse, ServerError> {
        self.store
            .get_task(id)
            .await?
            .map(|record| record.to_response())
            .ok_or_else(|| ServerError::NotFound(format!("Task not found: {id}")))
    }

    pub async fn search_by_title(&self, keyword: &str) -> Result<Vec<TaskResponse>, ServerError> {
        Ok(to_responses(self.store.find_by_title_containing(keyword).await?))
    }

    pub async fn get_by_completed(&self, completed: bool) -> Result<Vec<TaskResponse>, ServerError> {
        Ok(to_responses(self.store.find_by_completed(completed).await?))
    }

    pub async fn get_by_created_after(
        &self,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<TaskResponse>, ServerError> {
        Ok(to_responses(self.store.find_by_created_after(timestamp).await?))
    }

    pub async fn search_by_title_and_completed(
        &self,
        keyword: &str,
        completed: bool,
    ) -> Result<Vec<TaskResponse>, ServerError> {
        Ok(to_responses(
            self.store
                .find_by_title_containing_and_completed(keyword, completed)
                .await?,
        ))
    }

    /// Either filter may be absent; the boundary enforces "at least one".
    pub async fn search(
        &self,
        keyword: Option<&str>,
        completed: Option<bool>,
    ) -> Result<Vec<TaskResponse>, ServerError> {
        debug!(?keyword, ?completed, "flexible task search");
        Ok(to_responses(self.store.search_tasks(keyword, completed).await?))
    }
}

fn to_responses(records: Vec<TaskRecord>) -> Vec<TaskResponse> {
    records.iter().map(TaskRecord::to_response).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::SqliteStore;
    use chrono::SubsecRound;
    use std::sync::Mutex;

    async fn service() -> TaskService<SqliteStore> {
        TaskService::new(Arc::new(SqliteStore::in_memory().await.unwrap()))
    }

    fn request(title: &str, description: Option<&str>) -> TaskRequest {
        TaskRequest {
            title: title.to_owned(),
            description: description.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn create_sets_defaults_and_timestamp() {
        let svc = service().await;
        let before = Utc::now().trunc_subsecs(6);
        let created = svc.create_task(request("Write spec", Some("core design"))).await.unwrap();

        assert_eq!(created.title, "Write spec");
        assert_eq!(created.description.as_deref(), Some("core design"));
        assert!(!created.completed);
        let created_at: DateTime<Utc> = created.created_at.parse().unwrap();
        assert!(created_at >= before);

        let stored = svc.store().get_task(created.id).await.unwrap().unwrap();
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[tokio::test]
    async fn every_create_makes_a_new_record() {
        let svc = service().await;
        let a = svc.create_task(request("same", None)).await.unwrap();
        let b = svc.create_task(request("same", None)).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(svc.get_all_tasks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_by_id_round_trips_created_task() {
        let svc = service().await;
        let created = svc.create_task(request("Write spec", None)).await.unwrap();
        assert_eq!(svc.get_task_by_id(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn get_by_id_reports_missing_task() {
        let svc = service().await;
        match svc.get_task_by_id(42).await {
            Err(ServerError::NotFound(m)) => assert_eq!(m, "Task not found: 42"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn filters_return_empty_lists_not_errors() {
        let svc = service().await;
        assert!(svc.search_by_title("anything").await.unwrap().is_empty());
        assert!(svc.get_by_completed(true).await.unwrap().is_empty());
        assert!(svc.get_by_created_after(Utc::now()).await.unwrap().is_empty());
        assert!(svc.search_by_title_and_completed("x", false).await.unwrap().is_empty());
        assert!(svc.search(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn created_after_includes_recent_tasks() {
        let svc = service().await;
        let created = svc.create_task(request("fresh", None)).await.unwrap();
        let yesterday = Utc::now() - chrono::Duration::days(1);
        let found = svc.get_by_created_after(yesterday).await.unwrap();
        assert_eq!(found, vec![created]);
    }

    // ── delegation ────────────────────────────────────────────────────────────

    /// Store double that records the arguments of `search_tasks`.
    #[derive(Default)]
    struct RecordingStore {
        searches: Mutex<Vec<(Option<String>, Option<bool>)>>,
    }

    impl TaskStore for RecordingStore {
        async fn insert_task(&self, _task: NewTask) -> Result<TaskRecord, sqlx::Error> {
            Err(sqlx::Error::PoolClosed)
        }
        async fn get_task(&self, _id: i64) -> Result<Option<TaskRecord>, sqlx::Error> {
            Ok(None)
        }
        async fn list_tasks(&self) -> Result<Vec<TaskRecord>, sqlx::Error> {
            Ok(Vec::new())
        }
        async fn find_by_title_containing(&self, _k: &str) -> Result<Vec<TaskRecord>, sqlx::Error> {
            Ok(Vec::new())
        }
        async fn find_by_completed(&self, _c: bool) -> Result<Vec<TaskRecord>, sqlx::Error> {
            Ok(Vec::new())
        }
        async fn find_by_created_after(
            &self,
            _t: DateTime<Utc>,
        ) -> Result<Vec<TaskRecord>, sqlx::Error> {
            Ok(Vec::new())
        }
        async fn find_by_title_containing_and_completed(
            &self,
            _k: &str,
            _c: bool,
        ) -> Result<Vec<TaskRecord>, sqlx::Error> {
            Ok(Vec::new())
        }
        async fn find_by_title_or_description_containing(
            &self,
            _k: &str,
        ) -> Result<Vec<TaskRecord>, sqlx::Error> {
            Ok(Vec::new())
        }
        async fn find_completed(&self) -> Result<Vec<TaskRecord>, sqlx::Error> {
            Ok(Vec::new())
        }
        async fn search_tasks(
            &self,
            keyword: Option<&str>,
            completed: Option<bool>,
        ) -> Result<Vec<TaskRecord>, sqlx::Error> {
            self.searches
                .lock()
                .unwrap()
                .push((keyword.map(str::to_owned), completed));
            Ok(Vec::new())
        }
        async fn ping(&self) -> Result<(), sqlx::Error> {
            Err(sqlx::Error::PoolClosed)
        }
    }

    #[tokio::test]
    async fn search_forwards_filters_unchanged() {
        let store = Arc::new(RecordingStore::default());
        let svc = TaskService::new(Arc::clone(&store));

        svc.search(Some("x"), None).await.unwrap();
        svc.search(None, Some(true)).await.unwrap();
        svc.search(Some("x"), Some(false)).await.unwrap();

        let calls = store.searches.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                (Some("x".to_owned()), None),
                (None, Some(true)),
                (Some("x".to_owned()), Some(false)),
            ]
        );
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let svc = TaskService::new(Arc::new(RecordingStore::default()));
        let err = svc.create_task(request("doomed", None)).await.unwrap_err();
        assert!(matches!(err, ServerError::Database(_)));
    }

    #[tokio::test]
    async fn check_store_reports_reachability() {
        assert!(service().await.check_store().await.is_ok());

        let svc = TaskService::new(Arc::new(RecordingStore::default()));
        assert!(matches!(
            svc.check_store().await,
            Err(ServerError::Database(sqlx::Error::PoolClosed))
        ));
    }
}
