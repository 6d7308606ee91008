use std::time::Duration;

use dealergpt_core::prompt::{
    PromptBudget, DEFAULT_HISTORY_CHARS, DEFAULT_HISTORY_TURNS, DEFAULT_PROMPT_CHARS,
    DEFAULT_TURN_CHARS,
};
use dealergpt_pipeline::ConversationSettings;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `90`). Must exceed the model
    /// timeout so a slow model still yields the fallback answer.
    pub request_timeout_secs: u64,
    /// Time allowed for background tasks to stop after the listener closes.
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub dealergpt: DealerGptConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `90`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "90".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            dealergpt: DealerGptConfig::from_env(),
        }
    }
}

/// Assistant tuning knobs.
#[derive(Debug, Clone)]
pub struct DealerGptConfig {
    /// Deadline for one round of business data reads.
    pub data_timeout_secs: u64,
    pub history_turns: usize,
    pub history_char_budget: usize,
    pub prompt_char_budget: usize,
    /// Age after which the retention task prunes the memory store.
    pub retention_days: i64,
}

impl Default for DealerGptConfig {
    fn default() -> Self {
        Self {
            data_timeout_secs: 15,
            history_turns: DEFAULT_HISTORY_TURNS,
            history_char_budget: DEFAULT_HISTORY_CHARS,
            prompt_char_budget: DEFAULT_PROMPT_CHARS,
            retention_days: 90,
        }
    }
}

impl DealerGptConfig {
    /// | Env Var                         | Default |
    /// |---------------------------------|---------|
    /// | `DEALERGPT_DATA_TIMEOUT_SECS`   | `15`    |
    /// | `DEALERGPT_HISTORY_TURNS`       | `10`    |
    /// | `DEALERGPT_HISTORY_CHAR_BUDGET` | `6000`  |
    /// | `DEALERGPT_PROMPT_CHAR_BUDGET`  | `48000` |
    /// | `DEALERGPT_RETENTION_DAYS`      | `90`    |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_timeout_secs: env_or("DEALERGPT_DATA_TIMEOUT_SECS", defaults.data_timeout_secs),
            history_turns: env_or("DEALERGPT_HISTORY_TURNS", defaults.history_turns),
            history_char_budget: env_or(
                "DEALERGPT_HISTORY_CHAR_BUDGET",
                defaults.history_char_budget,
            ),
            prompt_char_budget: env_or("DEALERGPT_PROMPT_CHAR_BUDGET", defaults.prompt_char_budget),
            retention_days: env_or("DEALERGPT_RETENTION_DAYS", defaults.retention_days),
        }
    }

    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(self.data_timeout_secs)
    }

    /// Conversation settings for a model called with `llm_timeout`.
    pub fn conversation_settings(&self, llm_timeout: Duration) -> ConversationSettings {
        ConversationSettings {
            budget: PromptBudget {
                max_history_turns: self.history_turns,
                max_history_chars: self.history_char_budget,
                max_turn_chars: DEFAULT_TURN_CHARS,
                max_prompt_chars: self.prompt_char_budget,
            },
            llm_timeout,
            ..ConversationSettings::default()
        }
    }
}

/// Parse `name` if set; panics on an unparsable value.
fn env_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid number")),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_carry_budgets_and_timeout() {
        let config = DealerGptConfig {
            history_turns: 4,
            prompt_char_budget: 10_000,
            ..DealerGptConfig::default()
        };
        let settings = config.conversation_settings(Duration::from_secs(12));
        assert_eq!(settings.budget.max_history_turns, 4);
        assert_eq!(settings.budget.max_prompt_chars, 10_000);
        assert_eq!(settings.budget.max_history_chars, DEFAULT_HISTORY_CHARS);
        assert_eq!(settings.llm_timeout, Duration::from_secs(12));
        assert_eq!(settings.insight_limit, ConversationSettings::default().insight_limit);
    }
}
