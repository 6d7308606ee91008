//! Derived dealership KPIs.
//!
//! Zero denominators are floored to `1` rather than producing NaN or an
//! error. This reports e.g. a turnover of `5` for five sales against an empty
//! forecourt, which is what the dashboard has always shown.

use serde::{Deserialize, Serialize};

use crate::types::Date;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Revenue change (in percent) separating `growth` from `strong_growth`, and
/// `stable` from `decline`.
pub const TREND_THRESHOLD_PCT: f64 = 10.0;

/// Stock older than this many days counts as aged.
pub const AGED_STOCK_DAYS: i64 = 90;

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// Replace a zero denominator with `1`.
pub fn floor_denominator(value: f64) -> f64 {
    if value == 0.0 {
        1.0
    } else {
        value
    }
}

/// Units sold per unit currently in stock.
pub fn inventory_turnover(sold_count: i64, stock_count: i64) -> f64 {
    sold_count as f64 / stock_count.max(1) as f64
}

/// Gross profit as a percentage of the value of stock on hand.
pub fn gross_roi(gross_profit: f64, stock_value: f64) -> f64 {
    gross_profit / floor_denominator(stock_value) * 100.0
}

/// Share of closed outcomes that converted, as a percentage.
pub fn conversion_rate(converted: i64, total: i64) -> f64 {
    converted as f64 / total.max(1) as f64 * 100.0
}

/// Mean of `values`, `0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean number of days between purchase and sale.
///
/// Only pairs where both dates are present count. Returns `0` when no pair
/// qualifies.
pub fn average_days_to_sell<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (Option<Date>, Option<Date>)>,
{
    let days: Vec<f64> = pairs
        .into_iter()
        .filter_map(|(purchased, sold)| match (purchased, sold) {
            (Some(p), Some(s)) => Some((s - p).num_days() as f64),
            _ => None,
        })
        .collect();
    mean(&days)
}

/// Whole days a vehicle has been in stock as of `today`.
pub fn days_in_stock(purchase_date: Option<Date>, today: Date) -> Option<i64> {
    purchase_date.map(|p| (today - p).num_days().max(0))
}

// ---------------------------------------------------------------------------
// Trend classification
// ---------------------------------------------------------------------------

/// Direction of revenue between the last two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesTrend {
    StrongGrowth,
    Growth,
    #[default]
    Stable,
    Decline,
}

impl SalesTrend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongGrowth => "strong_growth",
            Self::Growth => "growth",
            Self::Stable => "stable",
            Self::Decline => "decline",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::StrongGrowth => "Strong growth",
            Self::Growth => "Growth",
            Self::Stable => "Stable",
            Self::Decline => "Decline",
        }
    }
}

/// Percentage change from `previous` to `current`; a zero `previous` is
/// floored to `1`.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    (current - previous) / floor_denominator(previous) * 100.0
}

/// Bucket a percentage change into a [`SalesTrend`].
///
/// | change            | trend           |
/// |-------------------|-----------------|
/// | `> +10%`          | `strong_growth` |
/// | `(0%, +10%]`      | `growth`        |
/// | `[-10%, 0%]`      | `stable`        |
/// | `< -10%`          | `decline`       |
pub fn classify_change(change_pct: f64) -> SalesTrend {
    if change_pct > TREND_THRESHOLD_PCT {
        SalesTrend::StrongGrowth
    } else if change_pct > 0.0 {
        SalesTrend::Growth
    } else if change_pct >= -TREND_THRESHOLD_PCT {
        SalesTrend::Stable
    } else {
        SalesTrend::Decline
    }
}

/// Classify the trend of a chronologically ordered revenue series by its last
/// two entries. Fewer than two periods is `stable`.
pub fn classify_trend(revenue_by_period: &[f64]) -> (SalesTrend, f64) {
    match revenue_by_period {
        [.., previous, current] => {
            let change = percent_change(*previous, *current);
            (classify_change(change), change)
        }
        _ => (SalesTrend::Stable, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    // -- turnover / ROI --

    #[test]
    fn turnover_floors_empty_stock_to_one() {
        assert!((inventory_turnover(5, 0) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn turnover_ratio() {
        assert!((inventory_turnover(30, 60) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn roi_is_percentage_of_stock_value() {
        assert!((gross_roi(25_000.0, 100_000.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn roi_with_no_stock_value_uses_unit_denominator() {
        assert!((gross_roi(1_500.0, 0.0) - 150_000.0).abs() < 1e-9);
    }

    #[test]
    fn conversion_rate_with_no_leads_is_zero() {
        assert_eq!(conversion_rate(0, 0), 0.0);
        assert!((conversion_rate(1, 4) - 25.0).abs() < f64::EPSILON);
    }

    // -- days to sell --

    #[test]
    fn average_days_to_sell_without_complete_pairs_is_zero() {
        let pairs = (0..10).map(|i| {
            if i % 2 == 0 {
                (None, Some(date(2026, 5, 1)))
            } else {
                (Some(date(2026, 3, 1)), None)
            }
        });
        assert_eq!(average_days_to_sell(pairs), 0.0);
    }

    #[test]
    fn average_days_to_sell_ignores_incomplete_pairs() {
        let pairs = vec![
            (Some(date(2026, 1, 1)), Some(date(2026, 1, 31))),
            (Some(date(2026, 2, 1)), Some(date(2026, 2, 11))),
            (None, Some(date(2026, 3, 1))),
        ];
        assert!((average_days_to_sell(pairs) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn days_in_stock_never_negative() {
        let today = date(2026, 10, 1);
        assert_eq!(days_in_stock(Some(date(2026, 10, 5)), today), Some(0));
        assert_eq!(days_in_stock(Some(date(2026, 9, 1)), today), Some(30));
        assert_eq!(days_in_stock(None, today), None);
    }

    // -- trend --

    #[test]
    fn trend_buckets_at_threshold_edges() {
        assert_eq!(classify_change(10.1), SalesTrend::StrongGrowth);
        assert_eq!(classify_change(10.0), SalesTrend::Growth);
        assert_eq!(classify_change(0.5), SalesTrend::Growth);
        assert_eq!(classify_change(0.0), SalesTrend::Stable);
        assert_eq!(classify_change(-10.0), SalesTrend::Stable);
        assert_eq!(classify_change(-10.1), SalesTrend::Decline);
    }

    #[test]
    fn trend_uses_last_two_periods_only() {
        let (trend, change) = classify_trend(&[10.0, 500.0, 100.0, 80.0]);
        assert_eq!(trend, SalesTrend::Decline);
        assert!((change + 20.0).abs() < 1e-9);
    }

    #[test]
    fn trend_with_single_period_is_stable() {
        assert_eq!(classify_trend(&[1_000.0]).0, SalesTrend::Stable);
        assert_eq!(classify_trend(&[]).0, SalesTrend::Stable);
    }

    #[test]
    fn trend_from_zero_revenue_is_strong_growth() {
        let (trend, change) = classify_trend(&[0.0, 50.0]);
        assert_eq!(trend, SalesTrend::StrongGrowth);
        assert!((change - 5_000.0).abs() < 1e-9);
    }
}
