//! Per-data-source health probe.
//!
//! Each backing table is counted concurrently under its own deadline; the
//! report carries latency and row count per source.

use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Serialize;

use crate::source::BusinessDataSource;

/// Data source name (as listed in the capabilities document) and its table.
const PROBES: [(&str, &str); 10] = [
    ("vehicles", "vehicles"),
    ("leads", "leads"),
    ("customers", "customers"),
    ("interactions", "interactions"),
    ("invoices", "invoices"),
    ("appointments", "appointments"),
    ("users", "users"),
    ("conversations", "dealergpt_conversations"),
    ("memory", "dealergpt_memory"),
    ("insights", "dealergpt_insights"),
];

#[derive(Debug, Clone, Serialize)]
pub struct DataSourceHealth {
    pub name: &'static str,
    pub healthy: bool,
    pub latency_ms: u64,
    pub row_count: Option<i64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `healthy`, `degraded` (some sources failed) or `unhealthy` (all failed).
    pub status: &'static str,
    pub sources: Vec<DataSourceHealth>,
}

/// Probe every data source concurrently.
pub async fn probe_data_sources(
    source: &dyn BusinessDataSource,
    timeout: Duration,
) -> HealthReport {
    let probes = PROBES.iter().map(|&(name, table)| async move {
        let started = Instant::now();
        let result = tokio::time::timeout(timeout, source.count_rows(table)).await;
        let latency_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(Ok(count)) => DataSourceHealth {
                name,
                healthy: true,
                latency_ms,
                row_count: Some(count),
                error: None,
            },
            Ok(Err(e)) => {
                tracing::warn!(source = name, error = %e, "Data source probe failed");
                DataSourceHealth {
                    name,
                    healthy: false,
                    latency_ms,
                    row_count: None,
                    error: Some(e.to_string()),
                }
            }
            Err(_) => {
                tracing::warn!(source = name, "Data source probe timed out");
                DataSourceHealth {
                    name,
                    healthy: false,
                    latency_ms,
                    row_count: None,
                    error: Some(format!("timed out after {}ms", timeout.as_millis())),
                }
            }
        }
    });
    let sources = join_all(probes).await;

    let healthy = sources.iter().filter(|s| s.healthy).count();
    let status = if healthy == sources.len() {
        "healthy"
    } else if healthy == 0 {
        "unhealthy"
    } else {
        "degraded"
    };

    HealthReport { status, sources }
}

#[cfg(test)]
mod tests {
    use dealergpt_core::capabilities::DATA_SOURCES;

    use super::*;
    use crate::testing::{stock, today, FakeSource};

    #[tokio::test]
    async fn all_sources_healthy() {
        let source = FakeSource {
            unsold: vec![stock(1, "BMW", 1.0, today())],
            ..Default::default()
        };
        let report = probe_data_sources(&source, Duration::from_secs(1)).await;
        assert_eq!(report.status, "healthy");
        assert_eq!(report.sources.len(), PROBES.len());
        assert_eq!(report.sources[0].row_count, Some(1));
    }

    #[tokio::test]
    async fn one_failure_degrades() {
        let source = FakeSource {
            fail_leads: true,
            ..Default::default()
        };
        let report = probe_data_sources(&source, Duration::from_secs(1)).await;
        assert_eq!(report.status, "degraded");
        let leads = report.sources.iter().find(|s| s.name == "leads").unwrap();
        assert!(!leads.healthy);
        assert!(leads.error.is_some());
    }

    #[tokio::test]
    async fn timeouts_make_everything_unhealthy() {
        let source = FakeSource {
            delay: Some(Duration::from_secs(30)),
            ..Default::default()
        };
        let report = probe_data_sources(&source, Duration::from_millis(20)).await;
        assert_eq!(report.status, "unhealthy");
    }

    #[test]
    fn probes_cover_every_advertised_source() {
        let names: Vec<&str> = PROBES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, DATA_SOURCES.to_vec());
    }
}
