//! Appointment entity model and DTOs.

use dealergpt_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `appointments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Appointment {
    pub id: DbId,
    pub lead_id: Option<DbId>,
    pub customer_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub appointment_type: String,
    pub scheduled_at: Timestamp,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for booking an appointment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointment {
    pub lead_id: Option<DbId>,
    pub customer_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub appointment_type: String,
    pub scheduled_at: Timestamp,
}
