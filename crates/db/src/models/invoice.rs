//! Sales invoice entity model and DTOs.

use dealergpt_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `invoices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub invoice_number: String,
    pub vehicle_id: DbId,
    pub customer_id: Option<DbId>,
    pub salesperson_id: Option<DbId>,
    pub sale_date: Date,
    pub total_amount: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoice {
    pub invoice_number: String,
    pub vehicle_id: DbId,
    pub customer_id: Option<DbId>,
    pub salesperson_id: Option<DbId>,
    pub sale_date: Date,
    pub total_amount: f64,
}
