//! Liveness endpoint backed by a database round-trip.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{OpenApi, ToSchema};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(HealthResponse)))]
pub struct HealthApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `"ok"` or `"unavailable"`.
    pub status: String,
    pub version: String,
    /// `"ok"`, or why the task database did not answer.
    pub database: String,
}

/// Reports 200 while the task database answers a trivial query, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server and task database are up", body = HealthResponse),
        (status = 503, description = "Task database unreachable", body = HealthResponse)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let version = env!("CARGO_PKG_VERSION").to_owned();
    match state.tasks.check_store().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_owned(),
                version,
                database: "ok".to_owned(),
            }),
        ),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_owned(),
                    version,
                    database: e.to_string(),
                }),
            )
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::entities::SqliteStore;

    async fn state() -> (Arc<AppState>, SqliteStore) {
        let store = SqliteStore::in_memory().await.unwrap();
        (Arc::new(AppState::new(Config::default(), store.clone())), store)
    }

    #[tokio::test]
    async fn healthy_store_reports_ok_with_version() {
        let (state, _store) = state().await;
        let (status, Json(body)) = get_health(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.database, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn closed_store_reports_unavailable() {
        let (state, store) = state().await;
        store.close().await;
        let (status, Json(body)) = get_health(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "unavailable");
        assert_ne!(body.database, "ok");
    }
}
