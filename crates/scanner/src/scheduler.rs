//! Interval scan loop

use crate::api::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// Run a scan immediately and then every `period` until shutdown.
///
/// A failed scan is logged and the loop waits for the next tick.
pub async fn run(state: Arc<AppState>, period: Duration, mut shutdown: broadcast::Receiver<()>) {
    info!(interval_secs = period.as_secs(), "Starting scan loop");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match state.run_scan().await {
                    Ok(report) => info!(
                        total_monthly_savings = %report.summary.total_monthly_savings,
                        findings = report.summary.findings.len(),
                        "Scheduled scan finished"
                    ),
                    Err(e) => warn!(error = %e, "Scheduled scan failed"),
                }
            }
            _ = shutdown.recv() => {
                info!("Shutting down scan loop");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanner_lib::history::{HistoryStore, InMemoryHistoryStore};
    use scanner_lib::provider::Inventory;
    use scanner_lib::ScanService;

    #[tokio::test]
    async fn test_loop_scans_at_startup_and_stops_on_shutdown() {
        let inventory = Arc::new(Inventory::default());
        let history = Arc::new(InMemoryHistoryStore::new());
        let service = ScanService::builder()
            .provider(inventory.clone())
            .sampler(inventory)
            .history(history.clone())
            .build()
            .unwrap();
        let state = Arc::new(AppState::new(Arc::new(service)));

        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(run(state.clone(), Duration::from_secs(3600), rx));

        while state.latest_report().await.is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tx.send(()).unwrap();
        handle.await.unwrap();

        assert_eq!(history.scan_all().await.unwrap().len(), 1);
    }
}
