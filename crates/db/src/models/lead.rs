//! Lead entity model and DTOs.

use dealergpt_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `leads` table.
///
/// `pipeline_stage`, `lead_quality` and `priority` hold the text forms of
/// [`dealergpt_core::dealership`] enums.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lead {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub vehicle_interest: Option<String>,
    pub pipeline_stage: String,
    pub lead_quality: String,
    pub priority: String,
    pub assigned_salesperson_id: Option<DbId>,
    pub next_follow_up_date: Option<Date>,
    pub estimated_value: Option<f64>,
    pub converted_customer_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a lead.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLead {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub vehicle_interest: Option<String>,
    pub pipeline_stage: Option<String>,
    pub lead_quality: Option<String>,
    pub priority: Option<String>,
    pub assigned_salesperson_id: Option<DbId>,
    pub next_follow_up_date: Option<Date>,
    pub estimated_value: Option<f64>,
}
