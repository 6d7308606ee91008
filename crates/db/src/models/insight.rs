//! Generated business insights.

use dealergpt_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `dealergpt_insights` table.
///
/// An empty `target_users` addresses every user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Insight {
    pub id: DbId,
    pub insight_type: String,
    pub title: String,
    pub description: String,
    pub data: serde_json::Value,
    pub priority: String,
    pub target_users: Vec<DbId>,
    pub is_active: bool,
    pub is_acknowledged: bool,
    pub acknowledged_by: Option<DbId>,
    pub acknowledged_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for storing a generated insight.
#[derive(Debug, Clone)]
pub struct CreateInsight {
    pub insight_type: String,
    pub title: String,
    pub description: String,
    pub data: serde_json::Value,
    pub priority: String,
    pub target_users: Vec<DbId>,
    pub expires_at: Option<Timestamp>,
}
