//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI document endpoint (disable with `TASK_API_ENABLE_SWAGGER=false`)
//! - Health / heartbeat route
//! - Task routes under the configured base path

pub mod doc;
mod health;
pub mod tasks;

use std::sync::Arc;

use axum::{middleware, Router};
use tower::ServiceBuilder;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let base_path = state.config.base_path.clone();

    let mut app = Router::new().merge(health::router());
    app = if base_path.is_empty() {
        app.merge(tasks::router())
    } else {
        app.nest(&base_path, tasks::router())
    };

    if state.config.enable_swagger {
        app = app.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs(&base_path)),
        );
    }

    app
        // Outermost layers execute first on the way in.
        .layer(
            ServiceBuilder::new()
                .layer(cors::cors_layer(&state))
                .layer(middleware::from_fn(trace::trace_middleware)),
        )
        .with_state(state)
}
