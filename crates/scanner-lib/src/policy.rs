//! Classification policy and pricing configuration
//!
//! Every tunable constant of a scan lives here so classifiers never carry
//! literals. Defaults reproduce the fixed contract values.

use crate::provider::SampleWindow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hours billed per day
pub const HOURS_PER_DAY: u32 = 24;

/// Thresholds and windows used by the classifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanPolicy {
    /// An instance is idle when its average utilization is strictly below this
    pub idle_threshold_percent: f64,
    /// Trailing window for utilization averages, in days
    pub utilization_window_days: u32,
    /// Granularity of utilization samples, in seconds
    pub utilization_bucket_secs: u64,
    /// Fixed month length used to project hourly prices
    pub billing_days_per_month: u32,
    /// Provider status that marks a volume as unattached
    pub unattached_status: String,
    /// Provider state of instances eligible for idle detection
    pub running_state: String,
    /// Maximum concurrent utilization lookups
    pub sample_concurrency: usize,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            idle_threshold_percent: 5.0,
            utilization_window_days: 7,
            utilization_bucket_secs: 3600,
            billing_days_per_month: 30,
            unattached_status: "available".to_string(),
            running_state: "running".to_string(),
            sample_concurrency: 8,
        }
    }
}

impl ScanPolicy {
    pub fn sample_window(&self) -> SampleWindow {
        SampleWindow {
            days: self.utilization_window_days,
            bucket_secs: self.utilization_bucket_secs,
        }
    }

    /// Billable hours in one projected month
    pub fn hours_per_month(&self) -> u32 {
        HOURS_PER_DAY * self.billing_days_per_month
    }
}

/// Overrides applied on top of the built-in price table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub storage_gb_month: Option<Decimal>,
    pub fallback_hourly: Option<Decimal>,
    pub hourly: HashMap<String, Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = ScanPolicy::default();
        assert_eq!(policy.idle_threshold_percent, 5.0);
        assert_eq!(policy.utilization_window_days, 7);
        assert_eq!(policy.utilization_bucket_secs, 3600);
        assert_eq!(policy.hours_per_month(), 720);
        assert_eq!(policy.unattached_status, "available");
        assert_eq!(policy.running_state, "running");
    }

    #[test]
    fn test_partial_policy_keeps_defaults() {
        let policy: ScanPolicy =
            serde_json::from_str(r#"{"idle_threshold_percent": 10.0}"#).unwrap();
        assert_eq!(policy.idle_threshold_percent, 10.0);
        assert_eq!(policy.billing_days_per_month, 30);
        assert_eq!(
            policy.sample_window(),
            SampleWindow {
                days: 7,
                bucket_secs: 3600
            }
        );
    }
}
