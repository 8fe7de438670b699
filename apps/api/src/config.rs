use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::analysis::normalizer::CodeFallback;
use crate::analysis::orchestrator::DEFAULT_MAX_ATTEMPTS;
use crate::llm_client::{ANTHROPIC_API_URL, DEFAULT_MODEL};

const DEFAULT_MAX_MANUSCRIPT_CHARS: usize = 100_000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub llm_api_url: String,
    pub llm_model: String,
    pub port: u16,
    pub rust_log: String,
    /// Gateway calls per analysis before falling back to normalization.
    pub max_classification_attempts: u32,
    pub code_fallback: CodeFallback,
    /// Manuscripts are clipped to this many characters before prompting.
    pub max_manuscript_chars: usize,
    /// Bounds the whole analysis, all attempts included.
    pub request_timeout_secs: u64,
    /// Overrides the embedded vocabulary lists when set.
    pub vocabulary_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_api_url: std::env::var("LLM_API_URL")
                .unwrap_or_else(|_| ANTHROPIC_API_URL.to_string()),
            llm_model: std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_classification_attempts: parse_env::<u32>(
                "MAX_CLASSIFICATION_ATTEMPTS",
                DEFAULT_MAX_ATTEMPTS,
            )?
            .max(1),
            code_fallback: match std::env::var("CODE_FALLBACK") {
                Ok(raw) => raw
                    .parse::<CodeFallback>()
                    .map_err(anyhow::Error::msg)
                    .context("CODE_FALLBACK is invalid")?,
                Err(_) => CodeFallback::default(),
            },
            max_manuscript_chars: parse_env("MAX_MANUSCRIPT_CHARS", DEFAULT_MAX_MANUSCRIPT_CHARS)?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            vocabulary_dir: std::env::var_os("VOCABULARY_DIR").map(PathBuf::from),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Parses `key` when set, otherwise returns `default`.
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn test_defaults() -> Self {
        Config {
            anthropic_api_key: "test-key".to_string(),
            llm_api_url: ANTHROPIC_API_URL.to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            max_classification_attempts: DEFAULT_MAX_ATTEMPTS,
            code_fallback: CodeFallback::Drop,
            max_manuscript_chars: DEFAULT_MAX_MANUSCRIPT_CHARS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            vocabulary_dir: None,
        }
    }
}
