//! Task endpoints.
//!
//! Shape validation happens here, before the service is called. Extractor
//! rejections are taken as `Result` so they surface as [`ServerError`] and
//! share the uniform error body.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;
use validator::Validate;

use crate::error::{ErrorResponse, ServerError, PARAM_VALIDATION_ERROR};
use crate::schemas::task::{
    parse_date_time, CompletedQuery, CreatedAfterQuery, SearchQuery, TaskRequest, TaskResponse,
    TitleAndCompletedQuery, TitleQuery,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_task,
        list_tasks,
        get_task,
        filter_created_after,
        filter_title_and_completed,
        search_tasks,
        filter_title,
        filter_completed
    ),
    components(schemas(TaskRequest, TaskResponse, ErrorResponse))
)]
pub struct TasksApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/search", get(search_tasks))
        .route("/tasks/{id}", get(get_task))
        .route("/tasks/filter/created-after", get(filter_created_after))
        .route("/tasks/filter/title-and-completed", get(filter_title_and_completed))
        .route("/tasks/filter/title", get(filter_title))
        .route("/tasks/filter/completed", get(filter_completed))
}

#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    request_body = TaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Blank or missing title", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ServerError> {
    let Json(req) = body?;
    req.validate()?;
    let created = state.tasks.create_task(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    responses(
        (status = 200, description = "All tasks, in storage order", body = [TaskResponse]),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TaskResponse>>, ServerError> {
    Ok(Json(state.tasks.get_all_tasks().await?))
}

#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "tasks",
    params(
        ("id" = i64, Path, description = "ID of the task to retrieve")
    ),
    responses(
        (status = 200, description = "Task retrieved", body = TaskResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TaskResponse>, ServerError> {
    let Path(id) = id?;
    Ok(Json(state.tasks.get_task_by_id(id).await?))
}

#[utoipa::path(
    get,
    path = "/tasks/filter/created-after",
    tag = "tasks",
    params(CreatedAfterQuery),
    responses(
        (status = 200, description = "Tasks created after the given instant", body = [TaskResponse]),
        (status = 400, description = "Missing or unparseable date", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn filter_created_after(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CreatedAfterQuery>, QueryRejection>,
) -> Result<Json<Vec<TaskResponse>>, ServerError> {
    let Query(q) = query?;
    let after = parse_date_time(&q.date)?;
    Ok(Json(state.tasks.get_by_created_after(after).await?))
}

#[utoipa::path(
    get,
    path = "/tasks/filter/title-and-completed",
    tag = "tasks",
    params(TitleAndCompletedQuery),
    responses(
        (status = 200, description = "Tasks matching title and status", body = [TaskResponse]),
        (status = 400, description = "Blank keyword or bad status", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn filter_title_and_completed(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TitleAndCompletedQuery>, QueryRejection>,
) -> Result<Json<Vec<TaskResponse>>, ServerError> {
    let Query(q) = query?;
    q.validate()
        .map_err(|e| ServerError::from_violations(PARAM_VALIDATION_ERROR, &e))?;
    Ok(Json(
        state
            .tasks
            .search_by_title_and_completed(&q.keyword, q.completed)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/tasks/search",
    tag = "tasks",
    params(SearchQuery),
    responses(
        (status = 200, description = "Tasks matching every supplied filter", body = [TaskResponse]),
        (status = 400, description = "Neither keyword nor completed supplied", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn search_tasks(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<TaskResponse>>, ServerError> {
    let Query(q) = query?;
    let filter = q.into_filter()?;
    Ok(Json(
        state
            .tasks
            .search(filter.keyword.as_deref(), filter.completed)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/tasks/filter/title",
    tag = "tasks",
    params(TitleQuery),
    responses(
        (status = 200, description = "Tasks whose title contains the keyword", body = [TaskResponse]),
        (status = 400, description = "Missing keyword", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn filter_title(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TitleQuery>, QueryRejection>,
) -> Result<Json<Vec<TaskResponse>>, ServerError> {
    let Query(q) = query?;
    Ok(Json(state.tasks.search_by_title(&q.keyword).await?))
}

#[utoipa::path(
    get,
    path = "/tasks/filter/completed",
    tag = "tasks",
    params(CompletedQuery),
    responses(
        (status = 200, description = "Tasks with the given completion status", body = [TaskResponse]),
        (status = 400, description = "Missing or unparseable status", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn filter_completed(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CompletedQuery>, QueryRejection>,
) -> Result<Json<Vec<TaskResponse>>, ServerError> {
    let Query(q) = query?;
    Ok(Json(state.tasks.get_by_completed(q.status).await?))
}
