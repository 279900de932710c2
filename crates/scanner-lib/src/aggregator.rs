//! Scan aggregation
//!
//! Runs both classifiers, merges their findings (volumes first, then
//! instances), totals the waste and hands the summary to the history store.
//! Persistence is best-effort: a failed write is returned as a warning next to
//! the computed summary.

use crate::classifier::{InstanceClassifier, VolumeClassifier};
use crate::error::{EnumerationStep, ScanError};
use crate::history::HistoryStore;
use crate::models::{
    HistoryOperation, InstanceDescriptor, ScanSummary, ScanWarning, VolumeDescriptor,
};
use crate::provider::ResourceProvider;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Aggregated result of one classification pass
#[derive(Debug, Clone)]
pub struct AggregateOutcome {
    pub summary: ScanSummary,
    pub warnings: Vec<ScanWarning>,
    pub volumes_inspected: usize,
    /// Running instances whose utilization was sampled
    pub instances_inspected: usize,
}

pub struct ScanAggregator {
    volumes: VolumeClassifier,
    instances: InstanceClassifier,
    history: Arc<dyn HistoryStore>,
}

impl ScanAggregator {
    pub fn new(
        volumes: VolumeClassifier,
        instances: InstanceClassifier,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            volumes,
            instances,
            history,
        }
    }

    /// Enumerate resources and run a pass.
    ///
    /// Both listings must succeed before anything is classified or persisted.
    pub async fn scan(&self, provider: &dyn ResourceProvider) -> Result<AggregateOutcome, ScanError> {
        let volumes = provider
            .list_volumes()
            .await
            .map_err(|e| ScanError::provider_unavailable(EnumerationStep::Volumes, e))?;
        let instances = provider
            .list_instances()
            .await
            .map_err(|e| ScanError::provider_unavailable(EnumerationStep::Instances, e))?;

        debug!(
            volumes = volumes.len(),
            instances = instances.len(),
            "Enumerated resources"
        );

        Ok(self.run(&volumes, &instances).await)
    }

    pub async fn run(
        &self,
        volumes: &[VolumeDescriptor],
        instances: &[InstanceDescriptor],
    ) -> AggregateOutcome {
        self.run_at(volumes, instances, Utc::now()).await
    }

    /// Run a pass with an explicit scan timestamp
    pub async fn run_at(
        &self,
        volumes: &[VolumeDescriptor],
        instances: &[InstanceDescriptor],
        scan_timestamp: DateTime<Utc>,
    ) -> AggregateOutcome {
        let (volume_result, instance_result) = tokio::join!(
            async { self.volumes.classify(volumes) },
            self.instances.classify(instances)
        );

        let unrounded_waste = volume_result.unrounded_waste + instance_result.unrounded_waste;
        let mut findings = volume_result.findings;
        findings.extend(instance_result.findings);

        let summary = ScanSummary::new(scan_timestamp, findings);
        let mut warnings = instance_result.warnings;

        info!(
            volumes = summary.volume_count(),
            instances = summary.instance_count(),
            total_monthly_savings = %summary.total_monthly_savings,
            unrounded_waste = %unrounded_waste,
            "Scan aggregated"
        );

        if let Err(e) = self.history.put(&summary).await {
            warn!(
                scan_date = %summary.scan_date,
                error = %e,
                "Could not persist scan summary"
            );
            warnings.push(ScanWarning::PersistenceFailure {
                operation: HistoryOperation::Write,
                reason: format!("{:#}", e),
            });
        }

        AggregateOutcome {
            summary,
            warnings,
            volumes_inspected: volumes.len(),
            instances_inspected: instance_result.inspected,
        }
    }
}
