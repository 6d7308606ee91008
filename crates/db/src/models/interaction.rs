//! Interaction (lead communication log) entity model and DTOs.

use dealergpt_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `interactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Interaction {
    pub id: DbId,
    pub lead_id: DbId,
    pub user_id: DbId,
    pub interaction_type: String,
    pub direction: String,
    pub outcome: Option<String>,
    pub notes: Option<String>,
    pub follow_up_required: bool,
    pub follow_up_date: Option<Date>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for logging an interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInteraction {
    pub lead_id: DbId,
    pub user_id: DbId,
    pub interaction_type: String,
    pub direction: String,
    pub outcome: Option<String>,
    pub notes: Option<String>,
    pub follow_up_required: Option<bool>,
    pub follow_up_date: Option<Date>,
}
