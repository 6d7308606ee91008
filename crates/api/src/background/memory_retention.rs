//! Periodic pruning of the DealerGPT memory store.

use std::sync::Arc;
use std::time::Duration;

use dealergpt_pipeline::PgMemoryStore;
use tokio_util::sync::CancellationToken;

/// How often the prune runs.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(24 * 3600);

/// Prune data older than `retention_days` every `interval` until `cancel`
/// fires. The first prune runs immediately.
pub async fn run(
    store: Arc<PgMemoryStore>,
    retention_days: i64,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        retention_days,
        interval_secs = interval.as_secs(),
        "Memory retention job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Memory retention job stopping");
                break;
            }
            _ = ticker.tick() => {
                match store.prune(retention_days).await {
                    Ok(report) if report.total() > 0 => {
                        tracing::info!(
                            deleted = report.total(),
                            "Memory retention: purged old rows"
                        );
                    }
                    Ok(_) => tracing::debug!("Memory retention: nothing to purge"),
                    Err(e) => tracing::error!(error = %e, "Memory retention: prune failed"),
                }
            }
        }
    }
}
