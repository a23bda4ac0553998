//! Request / response shapes for the task endpoints.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::entities::task::format_timestamp;
use crate::entities::TaskRecord;
use crate::error::{ServerError, PARAM_VALIDATION_ERROR, SEARCH_VALIDATION_ERROR};

// ── Bodies ───────────────────────────────────────────────────────────────────

/// Request body for `POST /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TaskRequest {
    /// Required; blank or whitespace-only titles are rejected.
    /// A missing field deserializes to `""` so it fails the same check.
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "title is mandatory"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Read projection of a task. Never carries `updatedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// RFC 3339 UTC timestamp with microsecond precision.
    pub created_at: String,
}

impl TaskRecord {
    pub fn to_response(&self) -> TaskResponse {
        TaskResponse {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            completed: self.completed,
            created_at: format_timestamp(self.created_at),
        }
    }
}

// ── Query strings ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CreatedAfterQuery {
    /// ISO-8601 date-time, with or without offset (no offset means UTC).
    pub date: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TitleAndCompletedQuery {
    #[validate(custom(function = "not_blank", message = "keyword must not be blank"))]
    pub keyword: String,
    pub completed: bool,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TitleQuery {
    pub keyword: String,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompletedQuery {
    pub status: bool,
}

/// Flexible search: both filters optional, at least one required.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub completed: Option<bool>,
}

/// A [`SearchQuery`] that passed the "at least one filter" rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub keyword: Option<String>,
    pub completed: Option<bool>,
}

pub const SEARCH_REQUIRES_FILTER: &str =
    "At least one of 'keyword' or 'completed' must be provided.";

impl SearchQuery {
    /// A keyword counts as present only if it is non-blank after trimming;
    /// `completed` counts as present whenever it was supplied. Blank keywords
    /// are dropped rather than forwarded.
    pub fn into_filter(self) -> Result<SearchFilter, ServerError> {
        let keyword = self.keyword.filter(|k| !k.trim().is_empty());
        if keyword.is_none() && self.completed.is_none() {
            return Err(ServerError::validation(
                SEARCH_VALIDATION_ERROR,
                SEARCH_REQUIRES_FILTER,
            ));
        }
        Ok(SearchFilter {
            keyword,
            completed: self.completed,
        })
    }
}

// ── Parsing helpers ──────────────────────────────────────────────────────────

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Parse an ISO-8601 date-time.
///
/// Accepts RFC 3339 (`2024-01-01T10:00:00Z`, `2024-01-01 10:00:00+02:00`) and
/// offset-less local forms (`2024-01-01T10:00:00`, `2024-01-01T10:00:00.5`,
/// `2024-01-01T10:00`), the latter read as UTC.
pub fn parse_date_time(raw: &str) -> Result<DateTime<Utc>, ServerError> {
    let raw = raw.trim();
    let normalized = normalize_date_time(raw);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            ServerError::validation(
                PARAM_VALIDATION_ERROR,
                format!("date '{raw}' is not a valid ISO-8601 date-time"),
            )
        })
}

/// `T`-separated form with an explicit offset sign.
fn normalize_date_time(raw: &str) -> String {
    let mut s = raw.to_owned();
    if s.as_bytes().get(10) == Some(&b' ') {
        s.replace_range(10..11, "T");
    }
    // An unescaped '+' in a query string decodes to a space.
    if let Some(i) = s.rfind(' ') {
        if is_utc_offset(&s[i + 1..]) {
            s.replace_range(i..i + 1, "+");
        }
    }
    s
}

/// `HH:MM`
fn is_utc_offset(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 5
        && b[2] == b':'
        && b.iter().enumerate().all(|(i, c)| i == 2 || c.is_ascii_digit())
}
