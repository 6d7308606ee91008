//! Keyed memory entries.

use dealergpt_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `dealergpt_memory` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemoryEntry {
    pub id: DbId,
    pub key: String,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub data: serde_json::Value,
    pub tags: Vec<String>,
    pub priority: String,
    pub relevance_score: f64,
    pub expires_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for saving a memory entry. Saving an existing key overwrites it.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveMemory {
    pub key: String,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub tags: Vec<String>,
    pub priority: Option<String>,
    pub relevance_score: Option<f64>,
    pub expires_at: Option<Timestamp>,
}

/// Row counts removed by a prune.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub memory_deleted: u64,
    pub insights_deleted: u64,
    pub conversations_deleted: u64,
}

impl PruneReport {
    pub fn total(&self) -> u64 {
        self.memory_deleted + self.insights_deleted + self.conversations_deleted
    }
}
