//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for task-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8080"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://tasks.db?mode=rwc"`).
    /// Use `"sqlite::memory:"` for a throwaway database.
    pub database_url: String,

    /// Upper bound on pooled database connections.
    /// In-memory databases always use a single connection.
    pub database_max_connections: u32,

    /// Path prefix every task route is mounted under, e.g. `"/api"`.
    /// An empty string mounts the routes at the root.
    pub base_path: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("TASK_API_BIND", "0.0.0.0:8080"),
            database_url: env_or("TASK_API_DATABASE_URL", "sqlite://tasks.db?mode=rwc"),
            database_max_connections: parse_env("TASK_API_DB_MAX_CONNECTIONS", 5),
            base_path: normalize_base_path(&env_or("TASK_API_BASE_PATH", "/api")),
            log_level: env_or("TASK_API_LOG", "info"),
            log_json: parse_flag("TASK_API_LOG_JSON", false),
            cors_allowed_origins: std::env::var("TASK_API_CORS_ORIGINS")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            enable_swagger: parse_flag("TASK_API_ENABLE_SWAGGER", true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_owned(),
            database_url: "sqlite::memory:".to_owned(),
            database_max_connections: 1,
            base_path: "/api".to_owned(),
            log_level: "info".to_owned(),
            log_json: false,
            cors_allowed_origins: None,
            enable_swagger: false,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

/// Axum's `nest` rejects empty or slash-only prefixes, and a trailing slash
/// would double up with the route paths.
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn base_path_is_normalized() {
        assert_eq!(normalize_base_path("/api"), "/api");
        assert_eq!(normalize_base_path("api/"), "/api");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path("  "), "");
        assert_eq!(normalize_base_path("/v2/api//"), "/v2/api");
    }

    #[test]
    fn default_config_uses_in_memory_database() {
        let cfg = Config::default();
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.base_path, "/api");
        assert!(!cfg.enable_swagger);
    }
}
