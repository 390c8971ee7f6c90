//! Chat completion backends for expense extraction
//!
//! # Architecture
//!
//! - `ExpenseBackend` trait: one completion call, prompt in, raw reply out
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_env();
//! let reply = ai.complete(&prompt).await?;
//! let fields = parsing::parse_expense_reply(&reply)?;
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai_compatible, mock). Default: openai_compatible
//! - see [`crate::config`] for the endpoint, model, credential and timeout

mod mock;
mod openai_compatible;
pub mod parsing;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;

use crate::config::ExtractionConfig;
use crate::error::Result;

/// Trait defining the interface for completion backends
///
/// Backends make a single attempt per call. Every failure is returned as a
/// typed [`crate::Error`]; implementations must not panic on bad input or
/// bad replies.
#[async_trait]
pub trait ExpenseBackend: Send + Sync {
    /// Send one prompt and return the raw text of the first reply choice
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the endpoint URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Hosted OpenAI-compatible chat completions (OpenRouter by default)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Offline backend for development and tests
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `openai_compatible` (default): uses [`ExtractionConfig::from_env`]
    /// - `mock`: heuristic offline extraction, no network
    pub fn from_env() -> Self {
        let backend =
            std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai_compatible".to_string());

        match backend.to_lowercase().as_str() {
            "openai_compatible" | "openai" | "openrouter" => {
                Self::from_config(ExtractionConfig::from_env())
            }
            "mock" => AIClient::Mock(MockBackend::new()),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to openai_compatible");
                Self::from_config(ExtractionConfig::from_env())
            }
        }
    }

    /// Create a hosted backend from explicit configuration
    pub fn from_config(config: ExtractionConfig) -> Self {
        AIClient::OpenAICompatible(OpenAICompatibleBackend::new(config))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl ExpenseBackend for AIClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        match self {
            AIClient::OpenAICompatible(b) => b.complete(prompt).await,
            AIClient::Mock(b) => b.complete(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
