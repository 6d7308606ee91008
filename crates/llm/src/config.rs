//! Model endpoint configuration.

use std::time::Duration;

/// Connection and sampling settings for the chat model.
///
/// `api_key` is optional: without one the client reports
/// [`crate::LlmError::NotConfigured`] instead of calling out.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_tokens: 1500,
            timeout: Duration::from_secs(60),
        }
    }
}

impl LlmConfig {
    /// Load from environment variables, falling back to [`Default`].
    ///
    /// | Env var              | Default                      |
    /// |----------------------|------------------------------|
    /// | `OPENAI_API_KEY`     | unset                        |
    /// | `OPENAI_BASE_URL`    | `https://api.openai.com/v1`  |
    /// | `OPENAI_MODEL`       | `gpt-4o`                     |
    /// | `OPENAI_TEMPERATURE` | `0.7`                        |
    /// | `OPENAI_MAX_TOKENS`  | `1500`                       |
    /// | `OPENAI_TIMEOUT_SECS`| `60`                         |
    ///
    /// # Panics
    ///
    /// Panics if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let base_url = std::env::var("OPENAI_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let model = std::env::var("OPENAI_MODEL").unwrap_or(defaults.model);

        let temperature: f32 = std::env::var("OPENAI_TEMPERATURE")
            .map(|v| v.parse().expect("OPENAI_TEMPERATURE must be a valid f32"))
            .unwrap_or(defaults.temperature);

        let max_tokens: u32 = std::env::var("OPENAI_MAX_TOKENS")
            .map(|v| v.parse().expect("OPENAI_MAX_TOKENS must be a valid u32"))
            .unwrap_or(defaults.max_tokens);

        let timeout = std::env::var("OPENAI_TIMEOUT_SECS")
            .map(|v| {
                Duration::from_secs(v.parse().expect("OPENAI_TIMEOUT_SECS must be a valid u64"))
            })
            .unwrap_or(defaults.timeout);

        Self {
            api_key,
            base_url,
            model,
            temperature,
            max_tokens,
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
