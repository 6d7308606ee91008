//! Stored DealerGPT exchanges.

use dealergpt_core::conversation::HistoryTurn;
use dealergpt_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `dealergpt_conversations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationRecord {
    pub id: DbId,
    pub user_id: DbId,
    pub session_id: String,
    pub message: String,
    pub response: String,
    pub context_used: Vec<String>,
    pub response_time_ms: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ConversationRecord> for HistoryTurn {
    fn from(record: ConversationRecord) -> Self {
        Self {
            message: record.message,
            response: record.response,
            created_at: record.created_at,
        }
    }
}

/// DTO for recording one exchange.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub user_id: DbId,
    pub session_id: String,
    pub message: String,
    pub response: String,
    pub context_used: Vec<String>,
    pub response_time_ms: i64,
}
