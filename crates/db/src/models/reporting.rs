//! Aggregate rows returned by the reporting queries.
//!
//! These are not table rows. Each struct mirrors the column list of one
//! `GROUP BY` query in [`crate::repositories::ReportingRepo`].

use dealergpt_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Customer base counters.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct CustomerStatsRow {
    pub total: i64,
    pub new_this_month: i64,
    pub repeat_customers: i64,
    pub total_lifetime_value: f64,
}

/// Interactions grouped by type and direction over a lookback window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InteractionCountRow {
    pub interaction_type: String,
    pub direction: String,
    pub count: i64,
    pub follow_ups_required: i64,
}

/// Scheduled appointments grouped by type and whether they fall today.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppointmentCountRow {
    pub appointment_type: String,
    pub is_today: bool,
    pub count: i64,
}

/// Invoices raised over a period.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct InvoiceTotalsRow {
    pub count: i64,
    pub total_amount: f64,
}

/// Per-salesperson totals for a period.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SalespersonStatsRow {
    pub user_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub units_sold: i64,
    pub revenue: f64,
    pub gross_profit: f64,
    pub leads_assigned: i64,
    pub leads_converted: i64,
}
