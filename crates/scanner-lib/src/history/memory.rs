//! In-memory history store for tests and single-process runs

use super::HistoryStore;
use crate::models::ScanSummary;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Process-local history store
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<BTreeMap<NaiveDate, ScanSummary>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing summaries
    pub fn with_records(records: impl IntoIterator<Item = ScanSummary>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|s| (s.scan_date, s)).collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn put(&self, summary: &ScanSummary) -> Result<()> {
        self.records
            .write()
            .await
            .insert(summary.scan_date, summary.clone());
        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<ScanSummary>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::recent;
    use chrono::{Duration, TimeZone, Utc};

    fn summary_days_ago(days: i64) -> ScanSummary {
        let ts = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap() - Duration::days(days);
        ScanSummary::new(ts, Vec::new())
    }

    #[tokio::test]
    async fn test_same_day_put_overwrites() {
        let store = InMemoryHistoryStore::new();
        let first = summary_days_ago(0);
        let mut second = first.clone();
        second.scan_timestamp = first.scan_timestamp + Duration::hours(3);

        store.put(&first).await.unwrap();
        store.put(&second).await.unwrap();

        let all = store.scan_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].scan_timestamp, second.scan_timestamp);
    }

    #[tokio::test]
    async fn test_recent_sorted_newest_first() {
        let store = InMemoryHistoryStore::with_records(
            [3, 0, 1, 2].into_iter().map(summary_days_ago),
        );
        assert_eq!(store.len().await, 4);

        let newest = recent(&store, Some(2)).await.unwrap();
        assert_eq!(newest.len(), 2);
        assert!(newest[0].scan_date > newest[1].scan_date);
        assert_eq!(newest[0].scan_date, summary_days_ago(0).scan_date);
    }
}
