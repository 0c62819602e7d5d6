use std::time::Duration;

use anyhow::{Context, Result};

/// Ingest service configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub db_max_connections: u32,
    /// Window used by the dashboard summary and CSV export when `days` is omitted.
    pub analytics_default_range_days: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            analytics_default_range_days: parse_env("ANALYTICS_DEFAULT_RANGE_DAYS", 30)
                .context("ANALYTICS_DEFAULT_RANGE_DAYS must be a positive integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse::<T>()?),
        Err(_) => Ok(default),
    }
}

pub const DEFAULT_SESSION_KEY: &str = "analytics_session_id";
pub const DEFAULT_VISITED_KEY: &str = "analytics_visited";
pub const DEFAULT_BEACON_PATH: &str = "/api/analytics/page-view";

/// Client-side tracker settings, supplied by whoever composes a `Tracker`.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Base URL of the ingest service, e.g. `https://example.org`.
    pub ingest_base_url: String,
    pub beacon_path: String,
    /// Minimum spacing between accepted scroll samples. Zero disables throttling.
    pub scroll_sample_interval: Duration,
    /// Context-scoped key holding the session id.
    pub session_key: String,
    /// Long-lived key marking that this client has visited before.
    pub visited_key: String,
}

impl TrackerConfig {
    pub fn new(ingest_base_url: impl Into<String>) -> Self {
        Self {
            ingest_base_url: ingest_base_url.into(),
            ..Self::default()
        }
    }

    pub fn beacon_url(&self) -> String {
        format!(
            "{}{}",
            self.ingest_base_url.trim_end_matches('/'),
            self.beacon_path
        )
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            ingest_base_url: "http://localhost:8080".to_string(),
            beacon_path: DEFAULT_BEACON_PATH.to_string(),
            scroll_sample_interval: Duration::from_millis(250),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            visited_key: DEFAULT_VISITED_KEY.to_string(),
        }
    }
}
