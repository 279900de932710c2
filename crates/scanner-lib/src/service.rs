//! One complete scan pass
//!
//! Enumerates resources, aggregates findings, persists the summary and
//! computes the trend, recording metrics, health and structured events
//! along the way.

use crate::aggregator::ScanAggregator;
use crate::classifier::{InstanceClassifier, VolumeClassifier};
use crate::error::ScanError;
use crate::health::HealthRegistry;
use crate::history::{self, HistoryStore};
use crate::models::{HistoryOperation, ResourceType, ScanReport, ScanWarning};
use crate::observability::{ScannerMetrics, StructuredLogger};
use crate::policy::ScanPolicy;
use crate::pricing::PricingTable;
use crate::provider::{ResourceProvider, UtilizationSampler};
use crate::trend::TrendAnalyzer;
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// History entries logged after each scan
const HISTORY_LOG_LIMIT: usize = 7;

pub struct ScanService {
    provider: Arc<dyn ResourceProvider>,
    history: Arc<dyn HistoryStore>,
    aggregator: ScanAggregator,
    trend: TrendAnalyzer,
    metrics: ScannerMetrics,
    logger: StructuredLogger,
    health: HealthRegistry,
}

impl ScanService {
    pub fn builder() -> ScanServiceBuilder {
        ScanServiceBuilder::new()
    }

    pub fn history(&self) -> Arc<dyn HistoryStore> {
        self.history.clone()
    }

    pub fn health(&self) -> &HealthRegistry {
        &self.health
    }

    /// Run one scan pass.
    ///
    /// Fails only when resource enumeration fails; every other fault is
    /// returned as a warning on the report.
    pub async fn run_scan(&self) -> Result<ScanReport, ScanError> {
        let start = Instant::now();

        let outcome = match self.aggregator.scan(self.provider.as_ref()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.metrics.inc_scan_failures(e.kind());
                self.logger.log_scan_failed(e.kind(), &e.to_string());
                self.health.record_failure(&e).await;
                return Err(e);
            }
        };

        let (trend, read_warning) = self
            .trend
            .compare_on(outcome.summary.scan_date, outcome.summary.total_monthly_savings)
            .await;

        let mut warnings = outcome.warnings;
        warnings.extend(read_warning);

        let report = ScanReport {
            summary: outcome.summary,
            trend,
            warnings,
        };

        let elapsed = start.elapsed();
        self.record(&report, outcome.volumes_inspected, outcome.instances_inspected);
        self.logger
            .log_scan_completed(&report.summary, elapsed.as_millis(), report.warnings.len());
        self.logger.log_trend(&report.trend);
        self.metrics.observe_scan_duration(elapsed.as_secs_f64());
        self.health.record_report(&report).await;

        if !report.trend_unavailable() {
            match history::recent(self.history.as_ref(), Some(HISTORY_LOG_LIMIT)).await {
                Ok(recent) => self.logger.log_history(&recent),
                Err(e) => warn!(error = %e, "Could not list recent history"),
            }
        }

        Ok(report)
    }

    fn record(&self, report: &ScanReport, volumes_inspected: usize, instances_inspected: usize) {
        self.metrics.record_summary(&report.summary);
        self.metrics
            .set_resources_inspected(ResourceType::Volume, volumes_inspected);
        self.metrics
            .set_resources_inspected(ResourceType::Instance, instances_inspected);

        for warning in &report.warnings {
            match warning {
                ScanWarning::SampleUnavailable { .. } => self.metrics.inc_sample_failures(),
                ScanWarning::PersistenceFailure { operation, .. } => {
                    self.metrics.inc_persistence_failures(match operation {
                        HistoryOperation::Write => "write",
                        HistoryOperation::Read => "read",
                    })
                }
            }
        }
    }
}

/// Builder wiring boundaries and policy into a [`ScanService`]
pub struct ScanServiceBuilder {
    provider: Option<Arc<dyn ResourceProvider>>,
    sampler: Option<Arc<dyn UtilizationSampler>>,
    history: Option<Arc<dyn HistoryStore>>,
    pricing: PricingTable,
    policy: ScanPolicy,
    account: String,
    health: Option<HealthRegistry>,
}

impl ScanServiceBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            sampler: None,
            history: None,
            pricing: PricingTable::default(),
            policy: ScanPolicy::default(),
            account: "default".to_string(),
            health: None,
        }
    }

    pub fn provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn sampler(mut self, sampler: Arc<dyn UtilizationSampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn policy(mut self, policy: ScanPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Account label attached to structured log events
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    /// Share an existing health registry (e.g. with the HTTP API)
    pub fn health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    pub fn build(self) -> Result<ScanService> {
        let provider = self
            .provider
            .ok_or_else(|| anyhow::anyhow!("Resource provider is required"))?;
        let sampler = self
            .sampler
            .ok_or_else(|| anyhow::anyhow!("Utilization sampler is required"))?;
        let history = self
            .history
            .ok_or_else(|| anyhow::anyhow!("History store is required"))?;

        let pricing = Arc::new(self.pricing);
        let aggregator = ScanAggregator::new(
            VolumeClassifier::new(pricing.clone(), &self.policy),
            InstanceClassifier::new(pricing, sampler, &self.policy),
            history.clone(),
        );

        Ok(ScanService {
            provider,
            history: history.clone(),
            aggregator,
            trend: TrendAnalyzer::new(history),
            metrics: ScannerMetrics::new(),
            logger: StructuredLogger::new(self.account),
            health: self.health.unwrap_or_default(),
        })
    }
}

impl Default for ScanServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
