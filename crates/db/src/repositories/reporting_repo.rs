//! Aggregate queries feeding the business snapshot.
//!
//! Each method runs one `GROUP BY` (or single-row aggregate) query. Row
//! shapes live in [`crate::models::reporting`].

use dealergpt_core::types::{Date, Timestamp};
use sqlx::PgPool;

use crate::models::reporting::{
    AppointmentCountRow, CustomerStatsRow, InteractionCountRow, InvoiceTotalsRow,
    SalespersonStatsRow,
};

pub struct ReportingRepo;

impl ReportingRepo {
    /// Customer counts and lifetime value. `month_start` bounds
    /// `new_this_month`.
    pub async fn customer_stats(
        pool: &PgPool,
        month_start: Timestamp,
    ) -> Result<CustomerStatsRow, sqlx::Error> {
        sqlx::query_as::<_, CustomerStatsRow>(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE created_at >= $1) AS new_this_month, \
                    COUNT(*) FILTER (WHERE total_purchases > 1) AS repeat_customers, \
                    COALESCE(SUM(total_spend), 0)::DOUBLE PRECISION AS total_lifetime_value \
             FROM customers",
        )
        .bind(month_start)
        .fetch_one(pool)
        .await
    }

    /// Interactions logged since `since`, grouped by type and direction.
    pub async fn interaction_counts(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<InteractionCountRow>, sqlx::Error> {
        sqlx::query_as::<_, InteractionCountRow>(
            "SELECT interaction_type, direction, COUNT(*) AS count, \
                    COUNT(*) FILTER (WHERE follow_up_required) AS follow_ups_required \
             FROM interactions \
             WHERE created_at >= $1 \
             GROUP BY interaction_type, direction \
             ORDER BY interaction_type, direction",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }

    /// Scheduled appointments in `[from, until)`, split at `today_end` into
    /// today and later.
    pub async fn appointment_counts(
        pool: &PgPool,
        from: Timestamp,
        today_end: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<AppointmentCountRow>, sqlx::Error> {
        sqlx::query_as::<_, AppointmentCountRow>(
            "SELECT appointment_type, (scheduled_at < $2) AS is_today, COUNT(*) AS count \
             FROM appointments \
             WHERE status = 'scheduled' AND scheduled_at >= $1 AND scheduled_at < $3 \
             GROUP BY appointment_type, (scheduled_at < $2) \
             ORDER BY appointment_type",
        )
        .bind(from)
        .bind(today_end)
        .bind(until)
        .fetch_all(pool)
        .await
    }

    /// Number and value of invoices with a sale date on or after `since`.
    pub async fn invoice_totals(
        pool: &PgPool,
        since: Date,
    ) -> Result<InvoiceTotalsRow, sqlx::Error> {
        sqlx::query_as::<_, InvoiceTotalsRow>(
            "SELECT COUNT(*) AS count, \
                    COALESCE(SUM(total_amount), 0)::DOUBLE PRECISION AS total_amount \
             FROM invoices \
             WHERE sale_date >= $1",
        )
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Sales since `since` and all-time lead counts for every active
    /// salesperson and manager, highest revenue first.
    pub async fn salesperson_stats(
        pool: &PgPool,
        since: Date,
    ) -> Result<Vec<SalespersonStatsRow>, sqlx::Error> {
        sqlx::query_as::<_, SalespersonStatsRow>(
            "SELECT u.id AS user_id, u.first_name, u.last_name, \
                    COALESCE(s.units_sold, 0)::BIGINT AS units_sold, \
                    COALESCE(s.revenue, 0)::DOUBLE PRECISION AS revenue, \
                    COALESCE(s.gross_profit, 0)::DOUBLE PRECISION AS gross_profit, \
                    COALESCE(l.leads_assigned, 0)::BIGINT AS leads_assigned, \
                    COALESCE(l.leads_converted, 0)::BIGINT AS leads_converted \
             FROM users u \
             LEFT JOIN ( \
                 SELECT salesperson_id, COUNT(*) AS units_sold, SUM(sale_price) AS revenue, \
                        SUM(sale_price - purchase_price) AS gross_profit \
                 FROM vehicles \
                 WHERE sales_status = 'sold' AND sale_date >= $1 \
                 GROUP BY salesperson_id \
             ) s ON s.salesperson_id = u.id \
             LEFT JOIN ( \
                 SELECT assigned_salesperson_id, COUNT(*) AS leads_assigned, \
                        COUNT(*) FILTER (WHERE pipeline_stage = 'converted') AS leads_converted \
                 FROM leads \
                 GROUP BY assigned_salesperson_id \
             ) l ON l.assigned_salesperson_id = u.id \
             WHERE u.is_active AND u.role IN ('salesperson', 'manager') \
             ORDER BY revenue DESC, u.id ASC",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }

    /// Row count of `table`, used by the health probe.
    ///
    /// `table` is always a compile-time constant, never user input.
    pub async fn count_rows(pool: &PgPool, table: &'static str) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {table}");
        sqlx::query_scalar::<_, i64>(&query).fetch_one(pool).await
    }
}
