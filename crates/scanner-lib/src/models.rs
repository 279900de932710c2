//! Core data models for the cost scanner

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display name used for instances without a name or `Name` tag
pub const UNNAMED_INSTANCE: &str = "unnamed";

/// Storage volume as reported by the resource provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeDescriptor {
    pub id: String,
    pub size_gb: u32,
    pub type_tag: String,
    /// Provider-reported attachment state (e.g. `available`, `in-use`)
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Compute instance as reported by the resource provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub class_tag: String,
    /// Provider-reported lifecycle state (e.g. `running`, `stopped`)
    pub state: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl InstanceDescriptor {
    /// Display label: explicit name, then the `Name` tag, then `"unnamed"`
    pub fn display_name(&self) -> &str {
        let non_empty = |n: &&str| !n.is_empty();
        self.name
            .as_deref()
            .filter(non_empty)
            .or_else(|| self.tags.get("Name").map(String::as_str).filter(non_empty))
            .unwrap_or(UNNAMED_INSTANCE)
    }
}

/// Kind of resource a finding refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Volume,
    Instance,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Volume => "volume",
            ResourceType::Instance => "instance",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single waste item reported by a classifier.
///
/// `monthly_cost` is rounded to two fractional digits when the finding is
/// created and is never re-rounded afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub resource_id: String,
    pub monthly_cost: Decimal,
    #[serde(flatten)]
    pub details: FindingDetails,
}

/// Type-specific attributes of a finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resource_type", rename_all = "snake_case")]
pub enum FindingDetails {
    Volume {
        size_gb: u32,
        volume_type: String,
        created_at: DateTime<Utc>,
    },
    Instance {
        name: String,
        instance_type: String,
        avg_utilization_percent: f64,
    },
}

impl Finding {
    pub fn resource_type(&self) -> ResourceType {
        match self.details {
            FindingDetails::Volume { .. } => ResourceType::Volume,
            FindingDetails::Instance { .. } => ResourceType::Instance,
        }
    }
}

/// One persisted record per scan run, keyed by `scan_date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_date: NaiveDate,
    pub scan_timestamp: DateTime<Utc>,
    pub findings: Vec<Finding>,
    pub total_monthly_savings: Decimal,
}

impl ScanSummary {
    /// Build a summary; the total is the exact sum of the per-finding costs
    pub fn new(scan_timestamp: DateTime<Utc>, findings: Vec<Finding>) -> Self {
        let total_monthly_savings = findings.iter().map(|f| f.monthly_cost).sum();
        Self {
            scan_date: scan_timestamp.date_naive(),
            scan_timestamp,
            findings,
            total_monthly_savings,
        }
    }

    pub fn count_of(&self, resource_type: ResourceType) -> usize {
        self.findings
            .iter()
            .filter(|f| f.resource_type() == resource_type)
            .count()
    }

    pub fn volume_count(&self) -> usize {
        self.count_of(ResourceType::Volume)
    }

    pub fn instance_count(&self) -> usize {
        self.count_of(ResourceType::Instance)
    }

    /// Waste attributed to one resource type
    pub fn waste_of(&self, resource_type: ResourceType) -> Decimal {
        self.findings
            .iter()
            .filter(|f| f.resource_type() == resource_type)
            .map(|f| f.monthly_cost)
            .sum()
    }
}

/// Direction of the day-over-day change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improved,
    Increased,
    Unchanged,
    NoHistory,
}

/// Comparison of the current total against the most recent prior scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub previous_total: Option<Decimal>,
    pub current_total: Decimal,
    /// `current_total - previous_total`; negative means improvement
    pub delta: Decimal,
    pub delta_percent: Decimal,
}

impl TrendResult {
    pub fn new(current_total: Decimal, previous_total: Option<Decimal>) -> Self {
        let Some(previous) = previous_total else {
            return Self::no_history(current_total);
        };

        let delta = current_total - previous;
        let delta_percent = if previous > Decimal::ZERO {
            crate::pricing::round_currency(delta / previous * Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        };

        Self {
            previous_total: Some(previous),
            current_total,
            delta,
            delta_percent,
        }
    }

    pub fn no_history(current_total: Decimal) -> Self {
        Self {
            previous_total: None,
            current_total,
            delta: Decimal::ZERO,
            delta_percent: Decimal::ZERO,
        }
    }

    pub fn direction(&self) -> TrendDirection {
        match self.previous_total {
            None => TrendDirection::NoHistory,
            Some(_) if self.delta < Decimal::ZERO => TrendDirection::Improved,
            Some(_) if self.delta > Decimal::ZERO => TrendDirection::Increased,
            Some(_) => TrendDirection::Unchanged,
        }
    }
}

/// Recoverable fault observed during a scan pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanWarning {
    /// Utilization could not be fetched; the instance was treated as 0% utilized
    SampleUnavailable { instance_id: String, reason: String },
    /// History could not be written or read
    PersistenceFailure {
        operation: HistoryOperation,
        reason: String,
    },
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanWarning::SampleUnavailable { instance_id, reason } => {
                write!(f, "utilization unavailable for {}: {}", instance_id, reason)
            }
            ScanWarning::PersistenceFailure { operation, reason } => {
                write!(f, "history {} failed: {}", operation, reason)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOperation {
    Write,
    Read,
}

impl std::fmt::Display for HistoryOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryOperation::Write => write!(f, "write"),
            HistoryOperation::Read => write!(f, "read"),
        }
    }
}

/// Result of one complete scan pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub summary: ScanSummary,
    pub trend: TrendResult,
    #[serde(default)]
    pub warnings: Vec<ScanWarning>,
}

impl ScanReport {
    /// True when the trend could not use history because a read failed
    pub fn trend_unavailable(&self) -> bool {
        self.warnings.iter().any(|w| {
            matches!(
                w,
                ScanWarning::PersistenceFailure {
                    operation: HistoryOperation::Read,
                    ..
                }
            )
        })
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}
