//! Unattached volume detection

use crate::models::{Finding, FindingDetails, VolumeDescriptor};
use crate::policy::ScanPolicy;
use crate::pricing::{round_currency, PricingTable};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

/// Output of a volume classification pass
#[derive(Debug, Clone, Default)]
pub struct VolumeClassification {
    pub findings: Vec<Finding>,
    /// Sum of the monthly costs before per-finding rounding
    pub unrounded_waste: Decimal,
}

/// Flags volumes whose reported status is the unattached state
pub struct VolumeClassifier {
    pricing: Arc<PricingTable>,
    unattached_status: String,
}

impl VolumeClassifier {
    pub fn new(pricing: Arc<PricingTable>, policy: &ScanPolicy) -> Self {
        Self {
            pricing,
            unattached_status: policy.unattached_status.clone(),
        }
    }

    /// The status is compared exactly; attachment is never inferred
    pub fn is_wasted(&self, volume: &VolumeDescriptor) -> bool {
        volume.status == self.unattached_status
    }

    /// Monthly cost of a volume before rounding
    pub fn raw_monthly_cost(&self, volume: &VolumeDescriptor) -> Decimal {
        Decimal::from(volume.size_gb) * self.pricing.cost_per_gb_month()
    }

    pub fn classify(&self, volumes: &[VolumeDescriptor]) -> VolumeClassification {
        let mut result = VolumeClassification::default();

        for volume in volumes.iter().filter(|v| self.is_wasted(v)) {
            let raw_cost = self.raw_monthly_cost(volume);
            let monthly_cost = round_currency(raw_cost);
            result.unrounded_waste += raw_cost;

            info!(
                event = "volume_unattached",
                volume_id = %volume.id,
                size_gb = volume.size_gb,
                volume_type = %volume.type_tag,
                monthly_cost = %monthly_cost,
                "Found unattached volume"
            );

            result.findings.push(Finding {
                resource_id: volume.id.clone(),
                monthly_cost,
                details: FindingDetails::Volume {
                    size_gb: volume.size_gb,
                    volume_type: volume.type_tag.clone(),
                    created_at: volume.created_at,
                },
            });
        }

        if result.findings.is_empty() {
            debug!(inspected = volumes.len(), "No unattached volumes found");
        }

        result
    }
}
