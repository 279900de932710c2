//! Snapshot-based provider and sampler
//!
//! An inventory is a JSON document holding the volumes, instances and
//! utilization datapoints of one account. [`InventoryFile`] re-reads it on
//! every enumeration so an external exporter can refresh it between scans.

use super::{windowed_average, ResourceProvider, SampleWindow, UtilizationSampler};
use crate::models::{InstanceDescriptor, VolumeDescriptor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

/// One utilization datapoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    pub timestamp: DateTime<Utc>,
    /// Average utilization percent over the datapoint's period
    pub average: f64,
}

/// In-memory account snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub volumes: Vec<VolumeDescriptor>,
    #[serde(default)]
    pub instances: Vec<InstanceDescriptor>,
    /// Datapoints keyed by instance id
    #[serde(default)]
    pub utilization: HashMap<String, Vec<Datapoint>>,
}

impl Inventory {
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).context("Failed to parse inventory")
    }

    /// Average utilization of `resource_id` for a window ending at `now`
    pub fn average_at(
        &self,
        resource_id: &str,
        window: SampleWindow,
        now: DateTime<Utc>,
    ) -> Option<f64> {
        self.utilization
            .get(resource_id)
            .and_then(|points| windowed_average(points, window, now))
    }
}

#[async_trait]
impl ResourceProvider for Inventory {
    async fn list_volumes(&self) -> Result<Vec<VolumeDescriptor>> {
        Ok(self.volumes.clone())
    }

    async fn list_instances(&self) -> Result<Vec<InstanceDescriptor>> {
        Ok(self.instances.clone())
    }
}

#[async_trait]
impl UtilizationSampler for Inventory {
    async fn average_utilization(
        &self,
        resource_id: &str,
        window: SampleWindow,
    ) -> Result<Option<f64>> {
        Ok(self.average_at(resource_id, window, Utc::now()))
    }
}

/// Inventory backed by a JSON file on disk.
///
/// Instance enumeration refreshes the cached snapshot that utilization
/// lookups read from, so one scan sees a consistent view of the file.
pub struct InventoryFile {
    path: PathBuf,
    snapshot: RwLock<Option<Inventory>>,
}

impl InventoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Inventory> {
        let data = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read inventory {:?}", self.path))?;
        let inventory = Inventory::from_json(&data)?;
        debug!(
            path = %self.path.display(),
            volumes = inventory.volumes.len(),
            instances = inventory.instances.len(),
            "Loaded inventory"
        );
        Ok(inventory)
    }
}

#[async_trait]
impl ResourceProvider for InventoryFile {
    async fn list_volumes(&self) -> Result<Vec<VolumeDescriptor>> {
        Ok(self.load().await?.volumes)
    }

    async fn list_instances(&self) -> Result<Vec<InstanceDescriptor>> {
        let inventory = self.load().await?;
        let instances = inventory.instances.clone();
        *self.snapshot.write().await = Some(inventory);
        Ok(instances)
    }
}

#[async_trait]
impl UtilizationSampler for InventoryFile {
    async fn average_utilization(
        &self,
        resource_id: &str,
        window: SampleWindow,
    ) -> Result<Option<f64>> {
        if let Some(inventory) = self.snapshot.read().await.as_ref() {
            return Ok(inventory.average_at(resource_id, window, Utc::now()));
        }

        let inventory = self.load().await?;
        let average = inventory.average_at(resource_id, window, Utc::now());
        *self.snapshot.write().await = Some(inventory);
        Ok(average)
    }
}
