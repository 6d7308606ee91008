//! The aggregated, point-in-time view of dealership state.
//!
//! A [`BusinessSnapshot`] is assembled per request by the aggregator in
//! `dealergpt_pipeline` and consumed by the prompt builder, the greeting and
//! insight derivation. `Default` is the all-empty snapshot used when the
//! underlying reads fail.

use serde::{Deserialize, Serialize};

use crate::kpi::SalesTrend;
use crate::types::{DbId, Timestamp};

/// A labelled count (vehicles per status, leads per stage, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountBy {
    pub label: String,
    pub count: i64,
}

/// Stock and sales grouped by manufacturer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakeBreakdown {
    pub make: String,
    pub stock_count: i64,
    pub stock_value: f64,
    pub sold_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub stock_count: i64,
    /// Sum of purchase prices of vehicles in stock.
    pub stock_value: f64,
    pub autolab_count: i64,
    pub awaiting_delivery_count: i64,
    pub average_stock_age_days: f64,
    /// Vehicles in stock for more than [`crate::kpi::AGED_STOCK_DAYS`].
    pub aged_stock_count: i64,
    /// Sorted by stock count, descending.
    pub by_make: Vec<MakeBreakdown>,
    pub by_status: Vec<CountBy>,
}

/// Revenue for one calendar month (`period` is `YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub period: String,
    pub units: i64,
    pub revenue: f64,
    pub gross_profit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub sold_count: i64,
    pub total_revenue: f64,
    pub gross_profit: f64,
    pub average_sale_price: f64,
    pub average_gross_profit: f64,
    pub average_days_to_sell: f64,
    pub inventory_turnover: f64,
    pub gross_roi: f64,
    pub trend: SalesTrend,
    pub revenue_change_pct: f64,
    /// Chronological, oldest first.
    pub monthly: Vec<MonthlyRevenue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadSummary {
    pub total: i64,
    /// Leads not yet converted or lost.
    pub active: i64,
    /// Funnel order.
    pub by_stage: Vec<CountBy>,
    pub hot_leads: i64,
    /// Active hot leads with no follow-up date booked.
    pub hot_leads_without_follow_up: i64,
    pub follow_ups_due_today: i64,
    pub overdue_follow_ups: i64,
    pub converted: i64,
    pub lost: i64,
    pub conversion_rate: f64,
    /// Sum of estimated values of active leads.
    pub pipeline_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCustomer {
    pub customer_id: DbId,
    pub name: String,
    pub total_spend: f64,
    pub purchases: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub total: i64,
    pub new_this_month: i64,
    /// Customers with more than one purchase.
    pub repeat_customers: i64,
    pub total_lifetime_value: f64,
    pub average_lifetime_value: f64,
    pub top_customers: Vec<TopCustomer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionSummary {
    /// Interactions logged in the lookback window.
    pub recent_count: i64,
    pub inbound: i64,
    pub outbound: i64,
    pub follow_ups_required: i64,
    pub by_type: Vec<CountBy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentSummary {
    pub today: i64,
    pub upcoming: i64,
    pub by_type: Vec<CountBy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalespersonPerformance {
    pub user_id: DbId,
    pub name: String,
    pub units_sold: i64,
    pub revenue: f64,
    pub gross_profit: f64,
    pub leads_assigned: i64,
    pub leads_converted: i64,
    pub conversion_rate: f64,
}

/// Invoices raised this month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub month_count: i64,
    pub month_value: f64,
}

/// Month-to-date and year-to-date headline numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadlineStats {
    pub month_units_sold: i64,
    pub month_revenue: f64,
    pub month_gross_profit: f64,
    pub ytd_units_sold: i64,
    pub ytd_revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessSnapshot {
    /// `None` for the all-defaults snapshot.
    pub generated_at: Option<Timestamp>,
    pub headline: HeadlineStats,
    pub inventory: InventorySummary,
    pub sales: SalesSummary,
    pub leads: LeadSummary,
    pub customers: CustomerSummary,
    pub interactions: InteractionSummary,
    pub appointments: AppointmentSummary,
    pub invoices: InvoiceSummary,
    /// Sorted by revenue, descending.
    pub team: Vec<SalespersonPerformance>,
}

impl BusinessSnapshot {
    /// Whether this snapshot was built from live data.
    pub fn is_live(&self) -> bool {
        self.generated_at.is_some()
    }
}
