use crate::routes::{health, tasks};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "task-server",
    description = "Create, fetch and search tasks",
    version = "0.1.0",
))]
pub struct ApiDoc;

/// OpenAPI document with the task routes mounted under `base_path`.
pub fn get_docs(base_path: &str) -> utoipa::openapi::OpenApi {
    let root = ApiDoc::openapi().merge_from(health::HealthApi::openapi());
    if base_path.is_empty() {
        root.merge_from(tasks::TasksApi::openapi())
    } else {
        root.nest(base_path, tasks::TasksApi::openapi())
    }
}
