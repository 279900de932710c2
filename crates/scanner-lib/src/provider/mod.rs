//! Resource provider and utilization sampler boundaries
//!
//! The scanner never talks to a cloud API directly. Resource listings and
//! utilization averages come through these traits, so a live SDK client, a
//! snapshot file, or a test fake can be plugged in.

mod inventory;

pub use inventory::{Datapoint, Inventory, InventoryFile};

use crate::models::{InstanceDescriptor, VolumeDescriptor};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Enumerates the account's current resources
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// List all storage volumes
    async fn list_volumes(&self) -> Result<Vec<VolumeDescriptor>>;

    /// List all compute instances
    async fn list_instances(&self) -> Result<Vec<InstanceDescriptor>>;
}

/// Trailing window over which utilization is averaged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow {
    pub days: u32,
    pub bucket_secs: u64,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self {
            days: 7,
            bucket_secs: 3600,
        }
    }
}

impl SampleWindow {
    /// Start of the window ending at `now`
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days))
    }
}

/// Supplies average utilization for a resource
#[async_trait]
pub trait UtilizationSampler: Send + Sync {
    /// Mean utilization percent over the trailing window.
    ///
    /// `Ok(None)` means the resource has no samples in the window.
    async fn average_utilization(
        &self,
        resource_id: &str,
        window: SampleWindow,
    ) -> Result<Option<f64>>;
}

/// Arithmetic mean of bucket averages.
///
/// Datapoints inside the window are grouped into `bucket_secs` buckets, each
/// bucket is averaged, then the bucket averages are averaged. Returns `None`
/// when no datapoint falls in `[now - window, now]`.
pub fn windowed_average(
    datapoints: &[Datapoint],
    window: SampleWindow,
    now: DateTime<Utc>,
) -> Option<f64> {
    let start = window.start(now);
    let bucket_secs = window.bucket_secs.max(1) as i64;

    let mut buckets: BTreeMap<i64, (f64, u32)> = BTreeMap::new();
    for point in datapoints
        .iter()
        .filter(|p| p.timestamp >= start && p.timestamp <= now)
    {
        let bucket = point.timestamp.timestamp().div_euclid(bucket_secs);
        let entry = buckets.entry(bucket).or_insert((0.0, 0));
        entry.0 += point.average;
        entry.1 += 1;
    }

    if buckets.is_empty() {
        return None;
    }

    let total: f64 = buckets.values().map(|(sum, n)| sum / f64::from(*n)).sum();
    Some(total / buckets.len() as f64)
}
