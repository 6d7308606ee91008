//! Data aggregation: fan out over a [`BusinessDataSource`] and reshape the
//! rows into a [`BusinessSnapshot`].
//!
//! Reads run concurrently under one deadline. [`DataAggregator::aggregate`]
//! fails as a whole when any read fails;
//! [`DataAggregator::aggregate_or_default`] substitutes the all-defaults
//! snapshot and says so.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Months, NaiveTime, Utc};
use serde::Serialize;

use dealergpt_core::dealership::{LeadQuality, PipelineStage, VehicleStatus};
use dealergpt_core::kpi::{
    average_days_to_sell, classify_trend, conversion_rate, days_in_stock, gross_roi,
    inventory_turnover, mean, AGED_STOCK_DAYS,
};
use dealergpt_core::snapshot::{
    AppointmentSummary, BusinessSnapshot, CountBy, CustomerSummary, HeadlineStats,
    InteractionSummary, InventorySummary, InvoiceSummary, LeadSummary, MakeBreakdown,
    MonthlyRevenue, SalesSummary, SalespersonPerformance, TopCustomer,
};
use dealergpt_core::types::{Date, Timestamp};
use dealergpt_db::models::customer::Customer;
use dealergpt_db::models::lead::Lead;
use dealergpt_db::models::reporting::{
    AppointmentCountRow, CustomerStatsRow, InteractionCountRow, InvoiceTotalsRow,
    SalespersonStatsRow,
};
use dealergpt_db::models::vehicle::{Vehicle, VehicleFilter};

use crate::error::PipelineError;
use crate::source::BusinessDataSource;

/// Number of calendar months in the revenue series, current month included.
const TREND_MONTHS: u32 = 6;
const INTERACTION_LOOKBACK_DAYS: i64 = 30;
const APPOINTMENT_LOOKAHEAD_DAYS: i64 = 7;
const TOP_CUSTOMERS: i64 = 5;
/// Maximum rows returned by an inventory slice.
pub const SLICE_LIMIT: i64 = 500;

// ---------------------------------------------------------------------------
// Reporting window
// ---------------------------------------------------------------------------

/// Calendar boundaries every read and summary is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingWindow {
    pub now: Timestamp,
    pub today: Date,
    pub month_start: Date,
    pub year_start: Date,
    /// First day of the oldest month in the revenue series.
    pub trend_start: Date,
}

impl ReportingWindow {
    pub fn at(now: Timestamp) -> Self {
        let today = now.date_naive();
        let month_start = Date::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
        let year_start = Date::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
        let trend_start = month_start
            .checked_sub_months(Months::new(TREND_MONTHS - 1))
            .unwrap_or(month_start);
        Self {
            now,
            today,
            month_start,
            year_start,
            trend_start,
        }
    }

    /// Earliest sale date any summary needs.
    pub fn sales_since(&self) -> Date {
        self.year_start.min(self.trend_start)
    }

    fn midnight(date: Date) -> Timestamp {
        date.and_time(NaiveTime::MIN).and_utc()
    }

    fn month_start_at(&self) -> Timestamp {
        Self::midnight(self.month_start)
    }

    fn today_start(&self) -> Timestamp {
        Self::midnight(self.today)
    }

    fn today_end(&self) -> Timestamp {
        self.today_start() + chrono::Duration::days(1)
    }

    fn appointments_until(&self) -> Timestamp {
        self.today_end() + chrono::Duration::days(APPOINTMENT_LOOKAHEAD_DAYS)
    }

    fn interactions_since(&self) -> Timestamp {
        self.now - chrono::Duration::days(INTERACTION_LOOKBACK_DAYS)
    }

    /// First day of each month in the revenue series, oldest first.
    fn trend_months(&self) -> Vec<Date> {
        let mut months = Vec::with_capacity(TREND_MONTHS as usize);
        let mut month = self.trend_start;
        while month <= self.month_start {
            months.push(month);
            match month.checked_add_months(Months::new(1)) {
                Some(next) => month = next,
                None => break,
            }
        }
        months
    }
}

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

/// Everything one aggregation reads, before reshaping.
#[derive(Debug, Clone, Default)]
pub struct RawBusinessData {
    pub unsold: Vec<Vehicle>,
    /// Sold since [`ReportingWindow::sales_since`].
    pub sold: Vec<Vehicle>,
    pub leads: Vec<Lead>,
    pub customer_stats: CustomerStatsRow,
    pub top_customers: Vec<Customer>,
    pub interactions: Vec<InteractionCountRow>,
    pub appointments: Vec<AppointmentCountRow>,
    pub team: Vec<SalespersonStatsRow>,
    /// Raised since the start of the month.
    pub invoices: InvoiceTotalsRow,
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// A snapshot plus whether it had to be replaced by the defaults.
#[derive(Debug, Clone)]
pub struct AggregatedSnapshot {
    pub snapshot: BusinessSnapshot,
    pub defaulted: bool,
}

/// Summary of a filtered subset of vehicles.
#[derive(Debug, Clone, Serialize)]
pub struct InventorySlice {
    pub matched: usize,
    /// Whether more rows matched than [`SLICE_LIMIT`].
    pub truncated: bool,
    pub inventory: InventorySummary,
    pub sold_count: i64,
    pub sold_revenue: f64,
    pub sold_gross_profit: f64,
    pub vehicles: Vec<Vehicle>,
}

#[derive(Clone)]
pub struct DataAggregator {
    source: Arc<dyn BusinessDataSource>,
    timeout: Duration,
}

impl DataAggregator {
    pub fn new(source: Arc<dyn BusinessDataSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Build a live snapshot. Fails if any read fails or the fan-out misses
    /// its deadline.
    pub async fn aggregate(&self) -> Result<BusinessSnapshot, PipelineError> {
        let window = ReportingWindow::at(Utc::now());
        let raw = self.fetch(&window).await?;
        Ok(build_snapshot(&raw, &window))
    }

    /// Like [`Self::aggregate`], but a failure yields the all-defaults
    /// snapshot with `defaulted` set.
    pub async fn aggregate_or_default(&self) -> AggregatedSnapshot {
        match self.aggregate().await {
            Ok(snapshot) => AggregatedSnapshot {
                snapshot,
                defaulted: false,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Aggregation failed, using empty snapshot");
                AggregatedSnapshot {
                    snapshot: BusinessSnapshot::default(),
                    defaulted: true,
                }
            }
        }
    }

    /// Summarise the vehicles matching `filter`.
    pub async fn inventory_slice(
        &self,
        filter: &VehicleFilter,
    ) -> Result<InventorySlice, PipelineError> {
        let today = Utc::now().date_naive();
        // One extra row tells us whether the limit cut the result.
        let mut vehicles = self
            .deadline("inventory slice", self.source.vehicles(filter, SLICE_LIMIT + 1))
            .await?;
        let truncated = vehicles.len() as i64 > SLICE_LIMIT;
        vehicles.truncate(SLICE_LIMIT as usize);

        let (sold, unsold): (Vec<&Vehicle>, Vec<&Vehicle>) = vehicles
            .iter()
            .partition(|v| v.sales_status == VehicleStatus::Sold.as_str());

        let inventory = summarize_inventory(&unsold, &sold, today);
        let sold_revenue = sold.iter().map(|v| v.sale_price.unwrap_or(0.0)).sum();
        let sold_gross_profit = sold.iter().filter_map(|v| v.gross_profit()).sum();

        Ok(InventorySlice {
            matched: vehicles.len(),
            truncated,
            inventory,
            sold_count: sold.len() as i64,
            sold_revenue,
            sold_gross_profit,
            vehicles,
        })
    }

    async fn fetch(&self, window: &ReportingWindow) -> Result<RawBusinessData, PipelineError> {
        let source = &self.source;
        let reads = async {
            tokio::try_join!(
                source.unsold_vehicles(),
                source.sold_vehicles(window.sales_since()),
                source.leads(),
                source.customer_stats(window.month_start_at()),
                source.top_customers(TOP_CUSTOMERS),
                source.interaction_counts(window.interactions_since()),
                source.appointment_counts(
                    window.today_start(),
                    window.today_end(),
                    window.appointments_until()
                ),
                source.salesperson_stats(window.month_start),
                source.invoice_totals(window.month_start),
            )
        };
        let (
            unsold,
            sold,
            leads,
            customer_stats,
            top_customers,
            interactions,
            appointments,
            team,
            invoices,
        ) = self.deadline("business data aggregation", reads).await?;

        tracing::debug!(
            unsold = unsold.len(),
            sold = sold.len(),
            leads = leads.len(),
            "Business data fetched",
        );

        Ok(RawBusinessData {
            unsold,
            sold,
            leads,
            customer_stats,
            top_customers,
            interactions,
            appointments,
            team,
            invoices,
        })
    }

    async fn deadline<T, F>(&self, operation: &'static str, fut: F) -> Result<T, PipelineError>
    where
        F: std::future::Future<Output = Result<T, PipelineError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| PipelineError::Timeout {
                operation,
                secs: self.timeout.as_secs(),
            })?
    }
}

// ---------------------------------------------------------------------------
// Reshaping
// ---------------------------------------------------------------------------

/// Reshape raw rows into a snapshot stamped with `window.now`.
pub fn build_snapshot(raw: &RawBusinessData, window: &ReportingWindow) -> BusinessSnapshot {
    let unsold: Vec<&Vehicle> = raw.unsold.iter().collect();
    let month_sold: Vec<&Vehicle> = raw
        .sold
        .iter()
        .filter(|v| v.sale_date.is_some_and(|d| d >= window.month_start))
        .collect();

    let inventory = summarize_inventory(&unsold, &month_sold, window.today);
    let sales = summarize_sales(&raw.sold, &month_sold, &inventory, window);
    let headline = summarize_headline(&raw.sold, &month_sold, window);

    BusinessSnapshot {
        generated_at: Some(window.now),
        headline,
        inventory,
        sales,
        leads: summarize_leads(&raw.leads, window.today),
        customers: summarize_customers(&raw.customer_stats, &raw.top_customers),
        interactions: summarize_interactions(&raw.interactions),
        appointments: summarize_appointments(&raw.appointments),
        invoices: InvoiceSummary {
            month_count: raw.invoices.count,
            month_value: raw.invoices.total_amount,
        },
        team: summarize_team(&raw.team),
    }
}

/// Stock figures for `unsold`; `sold` only feeds the per-make sold counts.
pub fn summarize_inventory(
    unsold: &[&Vehicle],
    sold: &[&Vehicle],
    today: Date,
) -> InventorySummary {
    let in_stock: Vec<&Vehicle> = unsold
        .iter()
        .copied()
        .filter(|v| v.sales_status == VehicleStatus::Stock.as_str())
        .collect();

    let ages: Vec<i64> = in_stock
        .iter()
        .filter_map(|v| days_in_stock(v.purchase_date, today))
        .collect();
    let age_values: Vec<f64> = ages.iter().map(|&d| d as f64).collect();

    let mut by_make: BTreeMap<&str, MakeBreakdown> = BTreeMap::new();
    for v in &in_stock {
        let entry = by_make.entry(v.make.as_str()).or_insert_with(|| empty_make(&v.make));
        entry.stock_count += 1;
        entry.stock_value += v.purchase_price.unwrap_or(0.0);
    }
    for v in sold {
        by_make
            .entry(v.make.as_str())
            .or_insert_with(|| empty_make(&v.make))
            .sold_count += 1;
    }
    let mut by_make: Vec<MakeBreakdown> = by_make.into_values().collect();
    by_make.sort_by(|a, b| {
        b.stock_count
            .cmp(&a.stock_count)
            .then(b.sold_count.cmp(&a.sold_count))
            .then(a.make.cmp(&b.make))
    });

    let count_status = |status: VehicleStatus| {
        unsold
            .iter()
            .filter(|v| v.sales_status == status.as_str())
            .count() as i64
    };
    let by_status = VehicleStatus::ALL
        .iter()
        .map(|&status| CountBy {
            label: status.as_str().to_string(),
            count: if status == VehicleStatus::Sold {
                sold.len() as i64
            } else {
                count_status(status)
            },
        })
        .collect();

    InventorySummary {
        stock_count: in_stock.len() as i64,
        stock_value: in_stock.iter().map(|v| v.purchase_price.unwrap_or(0.0)).sum(),
        autolab_count: count_status(VehicleStatus::Autolab),
        awaiting_delivery_count: count_status(VehicleStatus::AwaitingDelivery),
        average_stock_age_days: mean(&age_values),
        aged_stock_count: ages.iter().filter(|&&d| d > AGED_STOCK_DAYS).count() as i64,
        by_make,
        by_status,
    }
}

fn empty_make(make: &str) -> MakeBreakdown {
    MakeBreakdown {
        make: make.to_string(),
        stock_count: 0,
        stock_value: 0.0,
        sold_count: 0,
    }
}

fn summarize_sales(
    all_sold: &[Vehicle],
    month_sold: &[&Vehicle],
    inventory: &InventorySummary,
    window: &ReportingWindow,
) -> SalesSummary {
    let prices: Vec<f64> = month_sold.iter().filter_map(|v| v.sale_price).collect();
    let profits: Vec<f64> = month_sold.iter().filter_map(|v| v.gross_profit()).collect();
    let total_revenue: f64 = prices.iter().sum();
    let gross_profit: f64 = profits.iter().sum();
    let sold_count = month_sold.len() as i64;

    let monthly: Vec<MonthlyRevenue> = window
        .trend_months()
        .into_iter()
        .map(|start| {
            let in_month: Vec<&Vehicle> = all_sold
                .iter()
                .filter(|v| {
                    v.sale_date
                        .is_some_and(|d| d.year() == start.year() && d.month() == start.month())
                })
                .collect();
            MonthlyRevenue {
                period: start.format("%Y-%m").to_string(),
                units: in_month.len() as i64,
                revenue: in_month.iter().map(|v| v.sale_price.unwrap_or(0.0)).sum(),
                gross_profit: in_month.iter().filter_map(|v| v.gross_profit()).sum(),
            }
        })
        .collect();
    let revenue_series: Vec<f64> = monthly.iter().map(|m| m.revenue).collect();
    let (trend, revenue_change_pct) = classify_trend(&revenue_series);

    SalesSummary {
        sold_count,
        total_revenue,
        gross_profit,
        average_sale_price: mean(&prices),
        average_gross_profit: mean(&profits),
        average_days_to_sell: average_days_to_sell(
            month_sold.iter().map(|v| (v.purchase_date, v.sale_date)),
        ),
        inventory_turnover: inventory_turnover(sold_count, inventory.stock_count),
        gross_roi: gross_roi(gross_profit, inventory.stock_value),
        trend,
        revenue_change_pct,
        monthly,
    }
}

fn summarize_headline(
    all_sold: &[Vehicle],
    month_sold: &[&Vehicle],
    window: &ReportingWindow,
) -> HeadlineStats {
    let ytd: Vec<&Vehicle> = all_sold
        .iter()
        .filter(|v| v.sale_date.is_some_and(|d| d >= window.year_start))
        .collect();
    HeadlineStats {
        month_units_sold: month_sold.len() as i64,
        month_revenue: month_sold.iter().map(|v| v.sale_price.unwrap_or(0.0)).sum(),
        month_gross_profit: month_sold.iter().filter_map(|v| v.gross_profit()).sum(),
        ytd_units_sold: ytd.len() as i64,
        ytd_revenue: ytd.iter().map(|v| v.sale_price.unwrap_or(0.0)).sum(),
    }
}

pub fn summarize_leads(leads: &[Lead], today: Date) -> LeadSummary {
    let staged: Vec<(PipelineStage, &Lead)> = leads
        .iter()
        .filter_map(|lead| match PipelineStage::parse(&lead.pipeline_stage) {
            Ok(stage) => Some((stage, lead)),
            Err(e) => {
                tracing::warn!(lead_id = lead.id, error = %e, "Skipping lead with unknown stage");
                None
            }
        })
        .collect();
    let active: Vec<&Lead> = staged
        .iter()
        .filter(|(stage, _)| !stage.is_closed())
        .map(|(_, lead)| *lead)
        .collect();

    let count_stage = |wanted: PipelineStage| {
        staged.iter().filter(|(stage, _)| *stage == wanted).count() as i64
    };
    let converted = count_stage(PipelineStage::Converted);
    let total = staged.len() as i64;
    let hot: Vec<&&Lead> = active
        .iter()
        .filter(|l| l.lead_quality == LeadQuality::Hot.as_str())
        .collect();

    LeadSummary {
        total,
        active: active.len() as i64,
        by_stage: PipelineStage::ALL
            .iter()
            .map(|&stage| CountBy {
                label: stage.as_str().to_string(),
                count: count_stage(stage),
            })
            .collect(),
        hot_leads: hot.len() as i64,
        hot_leads_without_follow_up: hot
            .iter()
            .filter(|l| l.next_follow_up_date.is_none())
            .count() as i64,
        follow_ups_due_today: active
            .iter()
            .filter(|l| l.next_follow_up_date == Some(today))
            .count() as i64,
        overdue_follow_ups: active
            .iter()
            .filter(|l| l.next_follow_up_date.is_some_and(|d| d < today))
            .count() as i64,
        converted,
        lost: count_stage(PipelineStage::Lost),
        conversion_rate: conversion_rate(converted, total),
        pipeline_value: active.iter().filter_map(|l| l.estimated_value).sum(),
    }
}

fn summarize_customers(stats: &CustomerStatsRow, top: &[Customer]) -> CustomerSummary {
    CustomerSummary {
        total: stats.total,
        new_this_month: stats.new_this_month,
        repeat_customers: stats.repeat_customers,
        total_lifetime_value: stats.total_lifetime_value,
        average_lifetime_value: if stats.total > 0 {
            stats.total_lifetime_value / stats.total as f64
        } else {
            0.0
        },
        top_customers: top
            .iter()
            .map(|c| TopCustomer {
                customer_id: c.id,
                name: c.full_name(),
                total_spend: c.total_spend,
                purchases: c.total_purchases,
            })
            .collect(),
    }
}

fn summarize_interactions(rows: &[InteractionCountRow]) -> InteractionSummary {
    let by_direction = |direction: &str| {
        rows.iter()
            .filter(|r| r.direction == direction)
            .map(|r| r.count)
            .sum()
    };
    InteractionSummary {
        recent_count: rows.iter().map(|r| r.count).sum(),
        inbound: by_direction("inbound"),
        outbound: by_direction("outbound"),
        follow_ups_required: rows.iter().map(|r| r.follow_ups_required).sum(),
        by_type: count_by(rows.iter().map(|r| (r.interaction_type.as_str(), r.count))),
    }
}

fn summarize_appointments(rows: &[AppointmentCountRow]) -> AppointmentSummary {
    AppointmentSummary {
        today: rows.iter().filter(|r| r.is_today).map(|r| r.count).sum(),
        upcoming: rows.iter().filter(|r| !r.is_today).map(|r| r.count).sum(),
        by_type: count_by(rows.iter().map(|r| (r.appointment_type.as_str(), r.count))),
    }
}

fn summarize_team(rows: &[SalespersonStatsRow]) -> Vec<SalespersonPerformance> {
    rows.iter()
        .map(|r| SalespersonPerformance {
            user_id: r.user_id,
            name: format!("{} {}", r.first_name, r.last_name),
            units_sold: r.units_sold,
            revenue: r.revenue,
            gross_profit: r.gross_profit,
            leads_assigned: r.leads_assigned,
            leads_converted: r.leads_converted,
            conversion_rate: conversion_rate(r.leads_converted, r.leads_assigned),
        })
        .collect()
}

/// Sum counts per label, largest first, ties by label.
fn count_by<'a>(pairs: impl Iterator<Item = (&'a str, i64)>) -> Vec<CountBy> {
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for (label, count) in pairs {
        *totals.entry(label).or_default() += count;
    }
    let mut out: Vec<CountBy> = totals
        .into_iter()
        .map(|(label, count)| CountBy {
            label: label.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then(a.label.cmp(&b.label)));
    out
}
