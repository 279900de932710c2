//! Idle instance detection
//!
//! Running instances are sampled for their trailing-window average
//! utilization. An instance below the idle threshold is reported with its
//! projected monthly cost. Sampling failures fail open: the instance is
//! treated as 0% utilized and the scan continues.

use super::round_percent;
use crate::models::{Finding, FindingDetails, InstanceDescriptor, ScanWarning};
use crate::policy::ScanPolicy;
use crate::pricing::{round_currency, PricingTable};
use crate::provider::{SampleWindow, UtilizationSampler};
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Output of an instance classification pass
#[derive(Debug, Clone, Default)]
pub struct InstanceClassification {
    pub findings: Vec<Finding>,
    /// Sum of the monthly costs before per-finding rounding
    pub unrounded_waste: Decimal,
    /// Number of running instances that were sampled
    pub inspected: usize,
    pub warnings: Vec<ScanWarning>,
}

/// Utilization of one instance after fail-open handling
struct Sampled {
    utilization: f64,
    warning: Option<ScanWarning>,
}

pub struct InstanceClassifier {
    pricing: Arc<PricingTable>,
    sampler: Arc<dyn UtilizationSampler>,
    idle_threshold_percent: f64,
    running_state: String,
    window: SampleWindow,
    hours_per_month: u32,
    concurrency: usize,
}

impl InstanceClassifier {
    pub fn new(
        pricing: Arc<PricingTable>,
        sampler: Arc<dyn UtilizationSampler>,
        policy: &ScanPolicy,
    ) -> Self {
        Self {
            pricing,
            sampler,
            idle_threshold_percent: policy.idle_threshold_percent,
            running_state: policy.running_state.clone(),
            window: policy.sample_window(),
            hours_per_month: policy.hours_per_month(),
            concurrency: policy.sample_concurrency.max(1),
        }
    }

    /// Idle iff utilization is strictly below the threshold
    pub fn is_idle(&self, utilization_percent: f64) -> bool {
        utilization_percent < self.idle_threshold_percent
    }

    /// Projected monthly cost of a class before rounding
    pub fn raw_monthly_cost(&self, class_tag: &str) -> Decimal {
        self.pricing.hourly_rate(class_tag) * Decimal::from(self.hours_per_month)
    }

    async fn sample(&self, instance: &InstanceDescriptor) -> Sampled {
        match self
            .sampler
            .average_utilization(&instance.id, self.window)
            .await
        {
            Ok(Some(utilization)) => Sampled {
                utilization,
                warning: None,
            },
            Ok(None) => {
                debug!(instance_id = %instance.id, "No utilization samples, assuming 0%");
                Sampled {
                    utilization: 0.0,
                    warning: None,
                }
            }
            Err(e) => {
                warn!(
                    instance_id = %instance.id,
                    error = %e,
                    "Could not fetch utilization, treating instance as idle"
                );
                Sampled {
                    utilization: 0.0,
                    warning: Some(ScanWarning::SampleUnavailable {
                        instance_id: instance.id.clone(),
                        reason: format!("{:#}", e),
                    }),
                }
            }
        }
    }

    pub async fn classify(&self, instances: &[InstanceDescriptor]) -> InstanceClassification {
        let running: Vec<&InstanceDescriptor> = instances
            .iter()
            .filter(|i| i.state == self.running_state)
            .collect();

        // Collected up front so the stream owns its futures and stays `Send`.
        // `buffered` yields in input order regardless of completion order.
        let pending: Vec<_> = running.iter().map(|i| self.sample(i)).collect();
        let samples: Vec<Sampled> = stream::iter(pending)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut result = InstanceClassification {
            inspected: running.len(),
            ..Default::default()
        };

        for (instance, sampled) in running.into_iter().zip(samples) {
            result.warnings.extend(sampled.warning);
            let name = instance.display_name();

            if !self.is_idle(sampled.utilization) {
                debug!(
                    instance_id = %instance.id,
                    name = %name,
                    utilization_percent = sampled.utilization,
                    "Active instance"
                );
                continue;
            }

            if !self.pricing.is_known_class(&instance.class_tag) {
                debug!(
                    instance_id = %instance.id,
                    instance_type = %instance.class_tag,
                    fallback_hourly = %self.pricing.fallback_hourly_rate(),
                    "Unknown instance class, pricing at fallback rate"
                );
            }

            let raw_cost = self.raw_monthly_cost(&instance.class_tag);
            let monthly_cost = round_currency(raw_cost);
            result.unrounded_waste += raw_cost;

            info!(
                event = "instance_idle",
                instance_id = %instance.id,
                name = %name,
                instance_type = %instance.class_tag,
                utilization_percent = sampled.utilization,
                monthly_cost = %monthly_cost,
                "Found idle instance"
            );

            result.findings.push(Finding {
                resource_id: instance.id.clone(),
                monthly_cost,
                details: FindingDetails::Instance {
                    name: name.to_string(),
                    instance_type: instance.class_tag.clone(),
                    avg_utilization_percent: round_percent(sampled.utilization),
                },
            });
        }

        if result.findings.is_empty() {
            debug!(inspected = result.inspected, "No idle instances found");
        }

        result
    }
}
