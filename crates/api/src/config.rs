//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Service name the catalog instances are registered under.
pub const CATALOG_SERVICE_NAME: &str = "catalog-service";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// How to reach the catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Base URL used when no instances are listed.
    pub url: String,
    /// Discovered instance base URLs; when non-empty, calls round-robin over
    /// them and `url` is ignored.
    pub instances: Vec<String>,
    pub timeout: Duration,
    /// Whether the catalog only accepts integer course ids.
    pub numeric_ids: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8081".to_string(),
            instances: Vec::new(),
            timeout: Duration::from_millis(3000),
            numeric_ids: false,
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `8083`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `DATABASE_URL`: PostgreSQL URL; unset selects the in-memory store
/// - `SEED_STUDENTS`: comma-separated student ids registered at startup
///   when running in memory
/// - `CATALOG_URL`: catalog base URL (default: `"http://localhost:8081"`)
/// - `CATALOG_INSTANCES`: comma-separated instance URLs
/// - `CATALOG_TIMEOUT_MS`: per-call timeout (default: `3000`)
/// - `CATALOG_NUMERIC_IDS`: `true` if course ids must be integers
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub seed_students: Vec<String>,
    pub catalog: CatalogConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let catalog_defaults = CatalogConfig::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            seed_students: lookup("SEED_STUDENTS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            catalog: CatalogConfig {
                url: lookup("CATALOG_URL").unwrap_or(catalog_defaults.url),
                instances: lookup("CATALOG_INSTANCES")
                    .map(|v| split_list(&v))
                    .unwrap_or_default(),
                timeout: lookup("CATALOG_TIMEOUT_MS")
                    .and_then(|ms| ms.parse().ok())
                    .map(Duration::from_millis)
                    .unwrap_or(catalog_defaults.timeout),
                numeric_ids: lookup("CATALOG_NUMERIC_IDS")
                    .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
                    .unwrap_or(catalog_defaults.numeric_ids),
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8083,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            seed_students: Vec::new(),
            catalog: CatalogConfig::default(),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
