//! Cost Scanner - scheduled cloud waste audit
//!
//! Scans the configured inventory at startup and then on a fixed interval,
//! persisting one summary per day and serving reports over HTTP.

use anyhow::{Context, Result};
use cost_scanner::{api, config::ScannerConfig, scheduler};
use scanner_lib::{
    history::JsonFileHistoryStore, provider::InventoryFile, HealthRegistry, PricingTable,
    ScanService, StructuredLogger,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SCANNER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = ScannerConfig::load()?;
    let health_registry = HealthRegistry::new();
    health_registry.register_all().await;

    let inventory = Arc::new(InventoryFile::new(&config.inventory_path));
    let history = Arc::new(JsonFileHistoryStore::new(&config.history_path));
    info!(
        account = %config.account,
        inventory = %inventory.path().display(),
        history = %history.path().display(),
        "Scanner configured"
    );

    let service = ScanService::builder()
        .provider(inventory.clone())
        .sampler(inventory)
        .history(history)
        .pricing(PricingTable::from_config(&config.pricing))
        .policy(config.policy.clone())
        .account(config.account.clone())
        .health(health_registry)
        .build()
        .context("Failed to build scan service")?;

    let logger = StructuredLogger::new(&config.account);
    logger.log_startup(SCANNER_VERSION);

    let state = Arc::new(api::AppState::new(Arc::new(service)));
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let scan_handle = tokio::spawn(scheduler::run(
        state.clone(),
        Duration::from_secs(config.scan_interval_secs),
        shutdown_rx,
    ));
    let api_handle = tokio::spawn(api::serve(config.api_port, state));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            logger.log_shutdown("SIGINT received");
        }
        result = api_handle => {
            match result {
                Ok(Ok(())) => logger.log_shutdown("API server stopped"),
                Ok(Err(e)) => error!(error = %e, "API server failed"),
                Err(e) => error!(error = %e, "API server task panicked"),
            }
        }
    }

    let _ = shutdown_tx.send(());
    scan_handle.await?;
    info!("Shutting down");

    Ok(())
}
