// src/config.rs
use std::env;

use crate::utils::error::AppError;

pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

const DEFAULT_TICKERS: &str = "AAPL,MSFT,NVDA,TSLA,AMZN";
// SEC requires a descriptive User-Agent with a contact address.
const DEFAULT_SEC_USER_AGENT: &str = "sec_analyst/0.1 (contact: you@example.com)";

/// Process configuration, read from the environment exactly once at startup
/// and passed into constructors from there.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Key for the embedding/chat API. Only commands that embed or
    /// complete need it; ingestion runs without one.
    pub openai_api_key: Option<String>,
    pub sec_user_agent: String,
    pub default_tickers: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            sec_user_agent: env::var("SEC_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_SEC_USER_AGENT.to_string()),
            default_tickers: split_tickers(
                &env::var("TICKERS").unwrap_or_else(|_| DEFAULT_TICKERS.to_string()),
            ),
        }
    }

    /// Fails fast when a command needs the OpenAI API and no key is set.
    pub fn require_openai_key(&self) -> Result<&str, AppError> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("OPENAI_API_KEY is not set".to_string()))
    }
}

/// Splits a comma-separated ticker list, trimming and uppercasing entries.
pub fn split_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}
