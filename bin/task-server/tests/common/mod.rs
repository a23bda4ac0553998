//! Shared helpers for the router-level integration tests.
//!
//! Each integration test file is compiled as its own crate, so helpers used by
//! only some files would otherwise trigger dead-code warnings.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use chrono::{DateTime, Utc};
use task_server::entities::{NewTask, SqliteStore, TaskStore};
use task_server::{routes, AppState, Config};

/// Router over a fresh in-memory database, task routes under `/api`.
pub async fn test_app() -> Router {
    test_app_with(Config::default()).await
}

pub async fn test_app_with(config: Config) -> Router {
    test_app_and_store(config).await.0
}

/// Router plus a handle on the same store, for seeding rows the API
/// cannot create (e.g. completed tasks).
pub async fn test_app_and_store(config: Config) -> (Router, SqliteStore) {
    let store = SqliteStore::in_memory().await.expect("in-memory store");
    let app = routes::build(Arc::new(AppState::new(config, store.clone())));
    (app, store)
}

pub async fn seed_task(store: &SqliteStore, title: &str, completed: bool, created_at: DateTime<Utc>) {
    store
        .insert_task(NewTask {
            title: title.to_owned(),
            description: None,
            completed,
            created_at,
            updated_at: created_at,
        })
        .await
        .expect("seed task");
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Create a task through the API and return its response body.
pub async fn create_task(app: &Router, title: &str, description: Option<&str>) -> Value {
    let (status, body) = post_json(
        app,
        "/api/tasks",
        serde_json::json!({ "title": title, "description": description }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body
}

pub fn titles(body: &Value) -> Vec<String> {
    let mut titles: Vec<String> = body
        .as_array()
        .expect("JSON array")
        .iter()
        .map(|t| t["title"].as_str().unwrap_or_default().to_owned())
        .collect();
    titles.sort();
    titles
}
