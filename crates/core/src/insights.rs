//! Rules that turn a snapshot into acknowledgeable business insights.

use serde::Serialize;
use serde_json::json;

use crate::dealership::Priority;
use crate::format::{format_gbp, format_number, format_percent};
use crate::kpi::{SalesTrend, AGED_STOCK_DAYS};
use crate::snapshot::BusinessSnapshot;

/// Days a generated insight stays visible unless acknowledged first.
pub const INSIGHT_TTL_DAYS: i64 = 7;

/// Stock count below which the forecourt is considered thin.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Aged stock count at which the aged-stock insight becomes urgent.
pub const AGED_STOCK_URGENT: i64 = 10;

pub const INSIGHT_AGED_STOCK: &str = "aged_stock";
pub const INSIGHT_OVERDUE_FOLLOW_UPS: &str = "overdue_follow_ups";
pub const INSIGHT_HOT_LEADS: &str = "hot_leads";
pub const INSIGHT_SALES_TREND: &str = "sales_trend";
pub const INSIGHT_LOW_STOCK: &str = "low_stock";

/// An insight ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightDraft {
    pub insight_type: &'static str,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub data: serde_json::Value,
}

/// Derive insights from a live snapshot. The all-defaults snapshot yields
/// nothing.
pub fn derive_insights(snapshot: &BusinessSnapshot) -> Vec<InsightDraft> {
    if !snapshot.is_live() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let inv = &snapshot.inventory;
    let leads = &snapshot.leads;
    let sales = &snapshot.sales;

    if inv.aged_stock_count > 0 {
        out.push(InsightDraft {
            insight_type: INSIGHT_AGED_STOCK,
            title: "Aged stock needs attention".to_string(),
            description: format!(
                "{} vehicles have been in stock for more than {AGED_STOCK_DAYS} days. \
                 Consider repricing or targeted promotion.",
                format_number(inv.aged_stock_count)
            ),
            priority: if inv.aged_stock_count >= AGED_STOCK_URGENT {
                Priority::Urgent
            } else {
                Priority::High
            },
            data: json!({
                "aged_stock_count": inv.aged_stock_count,
                "average_stock_age_days": inv.average_stock_age_days,
            }),
        });
    }

    if leads.overdue_follow_ups > 0 {
        out.push(InsightDraft {
            insight_type: INSIGHT_OVERDUE_FOLLOW_UPS,
            title: "Overdue lead follow-ups".to_string(),
            description: format!(
                "{} leads are past their follow-up date.",
                format_number(leads.overdue_follow_ups)
            ),
            priority: Priority::High,
            data: json!({ "overdue_follow_ups": leads.overdue_follow_ups }),
        });
    }

    if leads.hot_leads_without_follow_up > 0 {
        out.push(InsightDraft {
            insight_type: INSIGHT_HOT_LEADS,
            title: "Hot leads without a follow-up".to_string(),
            description: format!(
                "{} of {} hot leads have no follow-up booked. Pipeline value is {}.",
                format_number(leads.hot_leads_without_follow_up),
                format_number(leads.hot_leads),
                format_gbp(leads.pipeline_value)
            ),
            priority: Priority::Medium,
            data: json!({
                "hot_leads": leads.hot_leads,
                "hot_leads_without_follow_up": leads.hot_leads_without_follow_up,
                "pipeline_value": leads.pipeline_value,
            }),
        });
    }

    match sales.trend {
        SalesTrend::Decline => out.push(InsightDraft {
            insight_type: INSIGHT_SALES_TREND,
            title: "Sales are declining".to_string(),
            description: format!(
                "Revenue changed by {} compared with the previous month.",
                format_percent(sales.revenue_change_pct)
            ),
            priority: Priority::High,
            data: json!({ "trend": sales.trend, "revenue_change_pct": sales.revenue_change_pct }),
        }),
        SalesTrend::StrongGrowth => out.push(InsightDraft {
            insight_type: INSIGHT_SALES_TREND,
            title: "Strong sales growth".to_string(),
            description: format!(
                "Revenue is up {} on the previous month.",
                format_percent(sales.revenue_change_pct)
            ),
            priority: Priority::Low,
            data: json!({ "trend": sales.trend, "revenue_change_pct": sales.revenue_change_pct }),
        }),
        SalesTrend::Growth | SalesTrend::Stable => {}
    }

    if inv.stock_count < LOW_STOCK_THRESHOLD {
        out.push(InsightDraft {
            insight_type: INSIGHT_LOW_STOCK,
            title: "Stock levels are low".to_string(),
            description: format!(
                "Only {} vehicles are available for sale.",
                format_number(inv.stock_count)
            ),
            priority: Priority::Medium,
            data: json!({ "stock_count": inv.stock_count }),
        });
    }

    out
}
