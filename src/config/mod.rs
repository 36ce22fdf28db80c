//! Environment-backed configuration.
//!
//! Credentials for the model backend, the search tool, and the workspace API
//! are required up front: a missing key is a startup error, never a mid-turn
//! surprise.

use crate::error::{DocentError, Result};

/// Default model served when `DOCENT_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

/// Default bind address for the webhook server.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";

/// Process configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub tavily_api_key: String,
    pub notion_api_key: String,
    pub model: String,
    pub bind_addr: String,
    pub anthropic_base_url: Option<String>,
    pub tavily_base_url: Option<String>,
    pub notion_base_url: Option<String>,
}

impl Config {
    /// Load from environment variables, reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        Ok(Self {
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
            tavily_api_key: require("TAVILY_API_KEY")?,
            notion_api_key: require("NOTION_API_KEY")?,
            model: std::env::var("DOCENT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            bind_addr: std::env::var("DOCENT_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            anthropic_base_url: std::env::var("ANTHROPIC_BASE_URL").ok(),
            tavily_base_url: std::env::var("TAVILY_BASE_URL").ok(),
            notion_base_url: std::env::var("NOTION_BASE_URL").ok(),
        })
    }
}

fn require(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(DocentError::Configuration(format!(
            "missing required environment variable: {var}"
        ))),
    }
}
