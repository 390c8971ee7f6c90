//! Extraction client configuration
//!
//! Read once at startup and handed to the client; nothing reads the
//! environment after that.
//!
//! Environment variables:
//! - `OPENROUTER_API_KEY`: API credential (required for real extraction)
//! - `FINGENIE_LLM_ENDPOINT`: Chat completions URL (default: OpenRouter)
//! - `FINGENIE_LLM_MODEL`: Model identifier (default: meta-llama/llama-3.1-8b-instruct)
//! - `FINGENIE_LLM_TIMEOUT_SECS`: Request timeout in seconds (optional, no timeout if unset)

use std::time::Duration;

use tracing::warn;

/// Default chat completions endpoint
pub const DEFAULT_ENDPOINT_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model identifier
pub const DEFAULT_MODEL_ID: &str = "meta-llama/llama-3.1-8b-instruct";

pub const CREDENTIAL_ENV: &str = "OPENROUTER_API_KEY";
pub const ENDPOINT_ENV: &str = "FINGENIE_LLM_ENDPOINT";
pub const MODEL_ENV: &str = "FINGENIE_LLM_MODEL";
pub const TIMEOUT_ENV: &str = "FINGENIE_LLM_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Full URL of the chat completions endpoint
    pub endpoint_url: String,
    pub model_id: String,
    /// Bearer token; `None` makes every extraction fail with a config error
    pub credential: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            credential: None,
            request_timeout: None,
        }
    }
}

impl ExtractionConfig {
    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test map, ...)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let request_timeout = non_empty(TIMEOUT_ENV).and_then(|secs| match secs.parse::<u64>() {
            Ok(s) if s > 0 => Some(Duration::from_secs(s)),
            _ => {
                warn!(value = %secs, "Ignoring invalid {}", TIMEOUT_ENV);
                None
            }
        });

        Self {
            endpoint_url: non_empty(ENDPOINT_ENV)
                .unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_string()),
            model_id: non_empty(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            credential: non_empty(CREDENTIAL_ENV),
            request_timeout,
        }
    }
}
