//! Conversation inputs and the reasons an answer can be degraded.

use serde::{Deserialize, Serialize};

use crate::dealership::Priority;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum accepted length of a user message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4_000;

/// Validate a chat message: must contain non-whitespace and stay within
/// [`MAX_MESSAGE_LENGTH`].
pub fn validate_message(message: &str) -> Result<(), CoreError> {
    if message.trim().is_empty() {
        return Err(CoreError::Validation(
            "Message must not be empty".to_string(),
        ));
    }
    let len = message.chars().count();
    if len > MAX_MESSAGE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Message exceeds maximum length of {MAX_MESSAGE_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// One earlier exchange, as fed back into the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub message: String,
    pub response: String,
    pub created_at: Timestamp,
}

/// The parts of an insight the prompt needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightBrief {
    pub id: DbId,
    pub insight_type: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

/// Why an answer was produced without live data or without the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    /// One of the business-data reads failed or timed out.
    DataUnavailable,
    /// The model call failed, timed out or is not configured.
    ModelUnavailable,
}

impl DegradedReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DataUnavailable => "data_unavailable",
            Self::ModelUnavailable => "model_unavailable",
        }
    }
}
