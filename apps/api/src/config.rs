use std::time::Duration;

use anyhow::{Context, Result};

use crate::jobs::refresh::RefreshPolicy;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub port: u16,
    pub rust_log: String,
    /// Header carrying the caller id injected by the upstream auth provider.
    pub identity_header: String,
    /// Upper bound for the insight get-or-create transaction.
    pub insight_tx_timeout: Duration,
    /// Six/seven-field cron expression (seconds first) for the refresh job.
    pub insight_refresh_cron: String,
    pub insight_refresh_policy: RefreshPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let insight_tx_timeout_secs = optional_env("INSIGHT_TX_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .context("INSIGHT_TX_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: optional_env("GEMINI_MODEL", "gemini-1.5-flash"),
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            identity_header: optional_env("IDENTITY_HEADER", "x-clerk-user-id").to_lowercase(),
            insight_tx_timeout: Duration::from_secs(insight_tx_timeout_secs),
            insight_refresh_cron: optional_env("INSIGHT_REFRESH_CRON", "0 0 0 * * Sun *"),
            insight_refresh_policy: optional_env("INSIGHT_REFRESH_POLICY", "all")
                .parse::<RefreshPolicy>()
                .map_err(anyhow::Error::msg)
                .context("INSIGHT_REFRESH_POLICY must be 'all' or 'due'")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
