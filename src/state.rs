use anyhow::{anyhow, Result};
use url::Url;

/// Connection settings for the remote planning API.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub schema_path: String,
    pub reports_path: String,
    pub export_dir: String,
    /// Request timeout in milliseconds; 0 leaves requests unbounded.
    pub http_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:3000".to_string(),
            schema_path: "/api/cerpschema".to_string(),
            reports_path: "/api/reports".to_string(),
            export_dir: ".".to_string(),
            http_timeout_ms: 0,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            api_base: std::env::var("API_URL").unwrap_or(d.api_base),
            schema_path: std::env::var("API_SCHEMA").unwrap_or(d.schema_path),
            reports_path: std::env::var("REPORTS_PATH").unwrap_or(d.reports_path),
            export_dir: std::env::var("EXPORT_DIR").unwrap_or(d.export_dir),
            http_timeout_ms: std::env::var("HTTP_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.http_timeout_ms),
        }
    }

    /// URL of a resource below the schema prefix, e.g. `task/7`.
    pub fn resource_url(&self, path: &str) -> Result<Url> {
        join_url(&self.api_base, &self.schema_path, path)
    }

    /// URL of a server-generated report file, e.g. `progress/csv`.
    pub fn reports_url(&self, path: &str) -> Result<Url> {
        join_url(&self.api_base, &self.reports_path, path)
    }
}

fn join_url(base: &str, prefix: &str, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        prefix.trim_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| anyhow!("invalid url {}: {}", joined, e))
}
