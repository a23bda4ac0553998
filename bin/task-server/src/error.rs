//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to an [`ErrorResponse`] JSON body with an appropriate status code.
//!
//! | Variant      | Status | `error` label                          |
//! |--------------|--------|----------------------------------------|
//! | `Validation` | 400    | context-specific, see the label consts |
//! | `NotFound`   | 404    | `"Task not found"`                     |
//! | `Database`   | 500    | `"Server error"`                       |
//! | `Internal`   | 500    | `"Server error"`                       |

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Label for request bodies that fail shape validation.
pub const BODY_VALIDATION_ERROR: &str = "Task creation/update validation error";

/// Label for the flexible search when neither filter is supplied.
pub const SEARCH_VALIDATION_ERROR: &str =
    "Validation Error: At least one of keyword or completed must be provided";

/// Label for missing, blank or undecodable query / path parameters.
pub const PARAM_VALIDATION_ERROR: &str = "Request parameter validation error";

pub const NOT_FOUND_ERROR: &str = "Task not found";
pub const SERVER_ERROR: &str = "Server error";

/// Uniform JSON body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Category label, e.g. `"Task not found"`.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}

/// All errors that can occur in the task-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid, incomplete or malformed request.
    #[error("{message}")]
    Validation {
        label: &'static str,
        message: String,
    },

    /// The caller referenced a task that does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn validation(label: &'static str, message: impl Into<String>) -> Self {
        ServerError::Validation {
            label,
            message: message.into(),
        }
    }

    /// Validation failure listing every field violation under `label`.
    pub fn from_violations(label: &'static str, errors: &ValidationErrors) -> Self {
        ServerError::validation(label, join_violations(errors))
    }

    /// Status code and body this error maps to.
    pub fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let (status, label, message) = match self {
            ServerError::Validation { label, message } => {
                (StatusCode::BAD_REQUEST, *label, message.clone())
            }
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, NOT_FOUND_ERROR, m.clone()),
            ServerError::Database(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR, e.to_string())
            }
            ServerError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR, m.clone()),
        };
        (
            status,
            ErrorResponse {
                error: label.to_owned(),
                message,
            },
        )
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::Validation { label, message } => {
                warn!(label = %label, detail = %message, "request validation failed");
            }
            ServerError::NotFound(m) => info!(detail = %m, "task not found"),
            ServerError::Database(e) => error!(error = %e, "database error"),
            ServerError::Internal(m) => error!(detail = %m, "internal server error"),
        }
        let (status, body) = self.to_error_response();
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}

impl From<ValidationErrors> for ServerError {
    fn from(errors: ValidationErrors) -> Self {
        ServerError::from_violations(BODY_VALIDATION_ERROR, &errors)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::validation(BODY_VALIDATION_ERROR, rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::validation(PARAM_VALIDATION_ERROR, rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        ServerError::validation(PARAM_VALIDATION_ERROR, rejection.body_text())
    }
}

/// Collect every field violation message into one comma-separated string.
///
/// Fields are visited in name order so the output is stable.
fn join_violations(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, violations)| {
            violations.iter().map(move |v| match &v.message {
                Some(m) => m.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
