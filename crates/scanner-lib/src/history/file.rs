//! JSON file history store
//!
//! The whole history is one JSON array rewritten on every put. Writes go to a
//! temp file that is renamed over the target, so a crash never leaves a
//! half-written history behind.

use super::HistoryStore;
use crate::models::ScanSummary;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

pub struct JsonFileHistoryStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<ScanSummary>> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read history {:?}", self.path))
            }
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&data)
            .with_context(|| format!("Failed to deserialize history {:?}", self.path))
    }

    async fn save(&self, summaries: &[ScanSummary]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }

        let json = serde_json::to_vec_pretty(summaries).context("Failed to serialize history")?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .with_context(|| format!("Failed to create temp file {:?}", temp_path))?;
        file.write_all(&json)
            .await
            .context("Failed to write history data")?;
        file.sync_all().await.context("Failed to sync history file")?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("Failed to rename {:?} to {:?}", temp_path, self.path))?;

        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistoryStore {
    async fn put(&self, summary: &ScanSummary) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut by_date: BTreeMap<NaiveDate, ScanSummary> = self
            .load()
            .await?
            .into_iter()
            .map(|s| (s.scan_date, s))
            .collect();
        by_date.insert(summary.scan_date, summary.clone());

        let summaries: Vec<ScanSummary> = by_date.into_values().collect();
        self.save(&summaries).await?;

        debug!(
            path = %self.path.display(),
            scan_date = %summary.scan_date,
            records = summaries.len(),
            "History persisted"
        );
        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<ScanSummary>> {
        self.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Finding, FindingDetails};
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn summary(day: u32, cost: rust_decimal::Decimal) -> ScanSummary {
        let ts = Utc.with_ymd_and_hms(2024, 6, day, 9, 30, 0).unwrap();
        ScanSummary::new(
            ts,
            vec![Finding {
                resource_id: format!("vol-{}", day),
                monthly_cost: cost,
                details: FindingDetails::Volume {
                    size_gb: 8,
                    volume_type: "gp3".to_string(),
                    created_at: ts - Duration::days(30),
                },
            }],
        )
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_history() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileHistoryStore::new(dir.path().join("history.json"));
        assert_eq!(store.path(), dir.path().join("history.json"));
        assert!(store.scan_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_and_scan_all_persist_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("history.json");

        {
            let store = JsonFileHistoryStore::new(&path);
            store.put(&summary(1, dec!(10.00))).await.unwrap();
            store.put(&summary(2, dec!(8.29))).await.unwrap();
        }

        let store = JsonFileHistoryStore::new(&path);
        let mut all = store.scan_all().await.unwrap();
        all.sort_by_key(|s| s.scan_date);

        assert_eq!(all.len(), 2);
        assert_eq!(all[0].total_monthly_savings, dec!(10.00));
        assert_eq!(all[1].total_monthly_savings, dec!(8.29));
        assert_eq!(all[1].findings[0].resource_id, "vol-2");
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_same_date_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileHistoryStore::new(dir.path().join("history.json"));

        store.put(&summary(5, dec!(1.00))).await.unwrap();
        store.put(&summary(5, dec!(2.50))).await.unwrap();

        let all = store.scan_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].total_monthly_savings, dec!(2.50));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, b"[{broken").unwrap();

        let store = JsonFileHistoryStore::new(&path);
        assert!(store.scan_all().await.is_err());
        assert!(store.put(&summary(1, dec!(1.00))).await.is_err());
    }
}
