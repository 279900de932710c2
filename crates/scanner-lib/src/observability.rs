//! Observability infrastructure for the cost scanner
//!
//! Provides:
//! - Prometheus metrics (scan latency, findings, waste, recoverable faults)
//! - Structured JSON logging with tracing

use crate::models::{ResourceType, ScanSummary, TrendResult};
use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge_vec, Gauge, Histogram, IntCounter, IntCounterVec, IntGaugeVec,
};
use rust_decimal::prelude::ToPrimitive;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for scan duration (in seconds)
const SCAN_LATENCY_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ScannerMetricsInner> = OnceLock::new();

struct ScannerMetricsInner {
    scan_duration_seconds: Histogram,
    scans_completed: IntCounter,
    scan_failures: IntCounterVec,
    findings: IntGaugeVec,
    monthly_waste: Gauge,
    resources_inspected: IntGaugeVec,
    sample_failures: IntCounter,
    persistence_failures: IntCounterVec,
}

impl ScannerMetricsInner {
    fn new() -> Self {
        Self {
            scan_duration_seconds: register_histogram!(
                "cost_scanner_scan_duration_seconds",
                "Time spent on one complete scan pass",
                SCAN_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register scan_duration_seconds"),

            scans_completed: register_int_counter!(
                "cost_scanner_scans_completed_total",
                "Number of scan passes that produced a summary"
            )
            .expect("Failed to register scans_completed"),

            scan_failures: register_int_counter_vec!(
                "cost_scanner_scan_failures_total",
                "Number of scan passes aborted by a fatal error",
                &["kind"]
            )
            .expect("Failed to register scan_failures"),

            findings: register_int_gauge_vec!(
                "cost_scanner_findings",
                "Waste findings in the latest scan",
                &["resource_type"]
            )
            .expect("Failed to register findings"),

            monthly_waste: register_gauge!(
                "cost_scanner_monthly_waste",
                "Estimated monthly waste in the latest scan, in currency units"
            )
            .expect("Failed to register monthly_waste"),

            resources_inspected: register_int_gauge_vec!(
                "cost_scanner_resources_inspected",
                "Resources considered by the latest scan",
                &["resource_type"]
            )
            .expect("Failed to register resources_inspected"),

            sample_failures: register_int_counter!(
                "cost_scanner_sample_failures_total",
                "Utilization lookups that failed and were treated as idle"
            )
            .expect("Failed to register sample_failures"),

            persistence_failures: register_int_counter_vec!(
                "cost_scanner_persistence_failures_total",
                "History reads or writes that failed",
                &["operation"]
            )
            .expect("Failed to register persistence_failures"),
        }
    }
}

/// Scanner metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ScannerMetrics {
    _private: (),
}

impl Default for ScannerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ScannerMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ScannerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ScannerMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_scan_duration(&self, duration_secs: f64) {
        self.inner().scan_duration_seconds.observe(duration_secs);
    }

    /// Record the outcome of a completed scan
    pub fn record_summary(&self, summary: &ScanSummary) {
        let inner = self.inner();
        inner.scans_completed.inc();
        for resource_type in [ResourceType::Volume, ResourceType::Instance] {
            inner
                .findings
                .with_label_values(&[resource_type.as_str()])
                .set(summary.count_of(resource_type) as i64);
        }
        inner
            .monthly_waste
            .set(summary.total_monthly_savings.to_f64().unwrap_or(0.0));
    }

    pub fn set_resources_inspected(&self, resource_type: ResourceType, count: usize) {
        self.inner()
            .resources_inspected
            .with_label_values(&[resource_type.as_str()])
            .set(count as i64);
    }

    pub fn inc_scan_failures(&self, kind: &str) {
        self.inner().scan_failures.with_label_values(&[kind]).inc();
    }

    pub fn inc_sample_failures(&self) {
        self.inner().sample_failures.inc();
    }

    pub fn inc_persistence_failures(&self, operation: &str) {
        self.inner()
            .persistence_failures
            .with_label_values(&[operation])
            .inc();
    }
}

/// Structured logger for scanner events
///
/// Provides consistent JSON-formatted logging for scan results, trends
/// and lifecycle events, labelled with the audited account.
#[derive(Clone)]
pub struct StructuredLogger {
    account: String,
}

impl StructuredLogger {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    /// Log a completed scan
    pub fn log_scan_completed(&self, summary: &ScanSummary, elapsed_ms: u128, warnings: usize) {
        info!(
            event = "scan_completed",
            account = %self.account,
            scan_date = %summary.scan_date,
            unattached_volumes = summary.volume_count(),
            idle_instances = summary.instance_count(),
            total_monthly_savings = %summary.total_monthly_savings,
            warnings = warnings,
            elapsed_ms = elapsed_ms as u64,
            "Scan completed"
        );
    }

    /// Log an aborted scan
    pub fn log_scan_failed(&self, kind: &str, error: &str) {
        warn!(
            event = "scan_failed",
            account = %self.account,
            kind = %kind,
            error = %error,
            "Scan aborted"
        );
    }

    /// Log the day-over-day comparison
    pub fn log_trend(&self, trend: &TrendResult) {
        match trend.previous_total {
            Some(previous) => info!(
                event = "trend_computed",
                account = %self.account,
                previous_total = %previous,
                current_total = %trend.current_total,
                delta = %trend.delta,
                delta_percent = %trend.delta_percent,
                "Computed waste trend"
            ),
            None => info!(
                event = "trend_computed",
                account = %self.account,
                current_total = %trend.current_total,
                "No prior scan to compare against"
            ),
        }
    }

    /// Log the recent history totals
    pub fn log_history(&self, history: &[ScanSummary]) {
        for summary in history {
            info!(
                event = "history_entry",
                account = %self.account,
                scan_date = %summary.scan_date,
                total_monthly_savings = %summary.total_monthly_savings,
                "Historical scan"
            );
        }
    }

    pub fn log_startup(&self, version: &str) {
        info!(
            event = "scanner_started",
            account = %self.account,
            scanner_version = %version,
            "Cost scanner started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "scanner_shutdown",
            account = %self.account,
            reason = %reason,
            "Cost scanner shutting down"
        );
    }
}
