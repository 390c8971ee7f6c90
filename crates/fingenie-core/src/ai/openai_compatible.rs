//! OpenAI-compatible backend implementation
//!
//! Talks to any server implementing the chat completions API. The default
//! endpoint is OpenRouter; self-hosted servers (vLLM, llama-server, LocalAI)
//! work by pointing `FINGENIE_LLM_ENDPOINT` at their `/v1/chat/completions`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ExtractionConfig, CREDENTIAL_ENV};
use crate::error::{Error, Result};

use super::ExpenseBackend;

/// OpenAI-compatible backend
///
/// One request per call, `temperature = 0`, no retries.
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    endpoint_url: String,
    model: String,
    credential: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a backend from extraction config
    ///
    /// A missing credential is not an error here; every call will fail with
    /// [`Error::Config`] until one is provided.
    pub fn new(config: ExtractionConfig) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().unwrap_or_else(|e| {
            warn!("Failed to build configured HTTP client, using defaults: {}", e);
            Client::new()
        });

        Self {
            http_client,
            endpoint_url: config.endpoint_url,
            model: config.model_id,
            credential: config.credential,
        }
    }

    /// Make a chat completion request
    async fn chat_completion(&self, prompt: &str) -> Result<String> {
        let credential = self.credential.as_deref().ok_or_else(|| {
            Error::Config(format!("{} is not set; cannot call the model", CREDENTIAL_ENV))
        })?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let response = self
            .http_client
            .post(&self.endpoint_url)
            .bearer_auth(credential)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let malformed = |reason: &str, raw: &str| Error::MalformedResponse {
            reason: reason.to_string(),
            raw: raw.to_string(),
        };

        let envelope: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| malformed(&format!("undecodable envelope: {}", e), &body))?;

        let choice = match envelope.choices {
            None => return Err(malformed("'choices' not found", &body)),
            Some(choices) => choices.into_iter().next(),
        };

        choice
            .ok_or_else(|| malformed("'choices' is empty", &body))?
            .message
            .content
            .ok_or_else(|| malformed("first choice has no message content", &body))
    }

    /// Models listing URL next to the chat completions endpoint
    fn models_url(&self) -> String {
        let base = self
            .endpoint_url
            .trim_end_matches('/')
            .trim_end_matches("/chat/completions");
        format!("{}/models", base)
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl ExpenseBackend for OpenAICompatibleBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let reply = self.chat_completion(prompt).await?;
        debug!("OpenAI-compatible response: {}", reply);
        Ok(reply)
    }

    async fn health_check(&self) -> bool {
        let Some(credential) = self.credential.as_deref() else {
            return false;
        };

        match self
            .http_client
            .get(self.models_url())
            .bearer_auth(credential)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("Health check failed for {}: {}", self.endpoint_url, e);
                false
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.endpoint_url
    }
}
