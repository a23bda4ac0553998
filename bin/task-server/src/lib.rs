//! task-server: a REST API for creating, fetching and searching tasks,
//! backed by SQLite.
//!
//! The binary in `main.rs` wires configuration, tracing and the HTTP server;
//! everything else lives here so integration tests can drive the router
//! directly.

pub mod config;
pub mod entities;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod schemas;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{ErrorResponse, ServerError};
pub use state::AppState;
