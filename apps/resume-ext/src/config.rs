use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Only settings that every command can live without are read here; the API
/// key is checked when a command actually needs the model.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub soffice_bin: String,
    pub inline_page_diagnostics: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_max_tokens: match optional_env("LLM_MAX_TOKENS") {
                Some(v) => v
                    .parse::<u32>()
                    .context("LLM_MAX_TOKENS must be a positive integer")?,
                None => DEFAULT_MAX_TOKENS,
            },
            soffice_bin: optional_env("SOFFICE_BIN").unwrap_or_else(|| "soffice".to_string()),
            inline_page_diagnostics: match optional_env("INLINE_PAGE_DIAGNOSTICS") {
                Some(v) => parse_bool(&v).with_context(|| {
                    format!("INLINE_PAGE_DIAGNOSTICS must be true or false, got '{v}'")
                })?,
                None => true,
            },
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Returns the API key or a readable error naming the missing variable.
    pub fn require_api_key(&self) -> Result<&str> {
        self.anthropic_api_key
            .as_deref()
            .context("Required environment variable 'ANTHROPIC_API_KEY' is not set")
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
