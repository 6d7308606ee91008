//! Read access to dealership business data.
//!
//! [`BusinessDataSource`] is the seam between the aggregator and storage.
//! [`PgDataSource`] answers it from Postgres through the repositories in
//! `dealergpt_db`.

use async_trait::async_trait;

use dealergpt_core::types::{Date, Timestamp};
use dealergpt_db::models::customer::Customer;
use dealergpt_db::models::lead::Lead;
use dealergpt_db::models::reporting::{
    AppointmentCountRow, CustomerStatsRow, InteractionCountRow, InvoiceTotalsRow,
    SalespersonStatsRow,
};
use dealergpt_db::models::vehicle::{Vehicle, VehicleFilter};
use dealergpt_db::repositories::{CustomerRepo, LeadRepo, ReportingRepo, VehicleRepo};
use dealergpt_db::DbPool;

use crate::error::PipelineError;

/// Independent, read-only queries the aggregator fans out over.
#[async_trait]
pub trait BusinessDataSource: Send + Sync {
    /// Vehicles not yet sold.
    async fn unsold_vehicles(&self) -> Result<Vec<Vehicle>, PipelineError>;

    /// Vehicles sold on or after `since`.
    async fn sold_vehicles(&self, since: Date) -> Result<Vec<Vehicle>, PipelineError>;

    async fn leads(&self) -> Result<Vec<Lead>, PipelineError>;

    async fn customer_stats(
        &self,
        month_start: Timestamp,
    ) -> Result<CustomerStatsRow, PipelineError>;

    async fn top_customers(&self, limit: i64) -> Result<Vec<Customer>, PipelineError>;

    async fn interaction_counts(
        &self,
        since: Timestamp,
    ) -> Result<Vec<InteractionCountRow>, PipelineError>;

    async fn appointment_counts(
        &self,
        from: Timestamp,
        today_end: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<AppointmentCountRow>, PipelineError>;

    async fn salesperson_stats(
        &self,
        since: Date,
    ) -> Result<Vec<SalespersonStatsRow>, PipelineError>;

    /// Invoices with a sale date on or after `since`.
    async fn invoice_totals(&self, since: Date) -> Result<InvoiceTotalsRow, PipelineError>;

    /// Filtered inventory slice, at most `limit` rows.
    async fn vehicles(
        &self,
        filter: &VehicleFilter,
        limit: i64,
    ) -> Result<Vec<Vehicle>, PipelineError>;

    /// Row count of one backing table, for the health probe.
    async fn count_rows(&self, table: &'static str) -> Result<i64, PipelineError>;
}

/// [`BusinessDataSource`] backed by the application database.
#[derive(Clone)]
pub struct PgDataSource {
    pool: DbPool,
}

impl PgDataSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessDataSource for PgDataSource {
    async fn unsold_vehicles(&self) -> Result<Vec<Vehicle>, PipelineError> {
        Ok(VehicleRepo::list_unsold(&self.pool).await?)
    }

    async fn sold_vehicles(&self, since: Date) -> Result<Vec<Vehicle>, PipelineError> {
        Ok(VehicleRepo::list_sold_since(&self.pool, since).await?)
    }

    async fn leads(&self) -> Result<Vec<Lead>, PipelineError> {
        Ok(LeadRepo::list(&self.pool).await?)
    }

    async fn customer_stats(
        &self,
        month_start: Timestamp,
    ) -> Result<CustomerStatsRow, PipelineError> {
        Ok(ReportingRepo::customer_stats(&self.pool, month_start).await?)
    }

    async fn top_customers(&self, limit: i64) -> Result<Vec<Customer>, PipelineError> {
        Ok(CustomerRepo::top_by_spend(&self.pool, limit).await?)
    }

    async fn interaction_counts(
        &self,
        since: Timestamp,
    ) -> Result<Vec<InteractionCountRow>, PipelineError> {
        Ok(ReportingRepo::interaction_counts(&self.pool, since).await?)
    }

    async fn appointment_counts(
        &self,
        from: Timestamp,
        today_end: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<AppointmentCountRow>, PipelineError> {
        Ok(ReportingRepo::appointment_counts(&self.pool, from, today_end, until).await?)
    }

    async fn salesperson_stats(
        &self,
        since: Date,
    ) -> Result<Vec<SalespersonStatsRow>, PipelineError> {
        Ok(ReportingRepo::salesperson_stats(&self.pool, since).await?)
    }

    async fn invoice_totals(&self, since: Date) -> Result<InvoiceTotalsRow, PipelineError> {
        Ok(ReportingRepo::invoice_totals(&self.pool, since).await?)
    }

    async fn vehicles(
        &self,
        filter: &VehicleFilter,
        limit: i64,
    ) -> Result<Vec<Vehicle>, PipelineError> {
        Ok(VehicleRepo::list_filtered(&self.pool, filter, limit).await?)
    }

    async fn count_rows(&self, table: &'static str) -> Result<i64, PipelineError> {
        Ok(ReportingRepo::count_rows(&self.pool, table).await?)
    }
}
