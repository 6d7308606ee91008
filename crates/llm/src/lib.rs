//! Chat-completion client for DealerGPT.
//!
//! [`ChatCompletion`] is the seam the conversation service depends on;
//! [`OpenAiChatApi`] implements it against any OpenAI-compatible
//! `/chat/completions` endpoint.

pub mod api;
pub mod config;
pub mod messages;

pub use api::{ChatCompletion, LlmError, OpenAiChatApi};
pub use config::LlmConfig;
pub use messages::{ChatMessage, ChatRole};
