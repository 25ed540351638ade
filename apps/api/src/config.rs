use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::export::print::DEFAULT_SETTLE;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Unset → every image is a stock placeholder.
    pub gemini_api_key: Option<String>,
    pub history_path: PathBuf,
    pub print_settle: Duration,
    /// Banner image shown at the top of both document modes.
    pub banner_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            history_path: optional_env("HISTORY_PATH")
                .unwrap_or_else(|| "itinerary_history.json".to_string())
                .into(),
            print_settle: match optional_env("PRINT_SETTLE_MS") {
                Some(ms) => Duration::from_millis(
                    ms.parse::<u64>()
                        .context("PRINT_SETTLE_MS must be a number of milliseconds")?,
                ),
                None => DEFAULT_SETTLE,
            },
            banner_url: optional_env("BANNER_URL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
