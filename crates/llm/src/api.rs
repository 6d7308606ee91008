//! REST client for OpenAI-compatible chat completions.

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::messages::{ChatMessage, CompletionRequest, CompletionResponse};

/// Errors from the model API layer.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key is configured.
    #[error("Language model is not configured")]
    NotConfigured,

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Model API error ({status}): {body}")]
    Api {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The API answered but the first choice carried no text.
    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// A chat model that turns a message list into one reply.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;

    /// Model identifier, for logs and the capabilities document.
    fn model(&self) -> &str;

    /// Whether calls can succeed at all.
    fn is_configured(&self) -> bool;
}

/// HTTP client for an OpenAI-compatible endpoint.
pub struct OpenAiChatApi {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiChatApi {
    /// Build a client whose requests time out after `config.timeout`.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, or return
    /// [`LlmError::Api`] carrying the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChatApi {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let api_key = self.config.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        let body = CompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let started = std::time::Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let parsed = response.json::<CompletionResponse>().await?;

        tracing::debug!(
            model = %self.config.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chat completion finished",
        );

        parsed.into_text().ok_or(LlmError::EmptyResponse)
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}
