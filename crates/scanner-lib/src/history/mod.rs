//! Scan history persistence
//!
//! Summaries are keyed by calendar date. A second scan on the same day
//! replaces the earlier record (last-write-wins).

mod file;
mod memory;

pub use file::JsonFileHistoryStore;
pub use memory::InMemoryHistoryStore;

use crate::models::ScanSummary;
use anyhow::Result;
use async_trait::async_trait;

/// Durable store of past scan summaries
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist a summary, replacing any record for the same `scan_date`
    async fn put(&self, summary: &ScanSummary) -> Result<()>;

    /// All persisted summaries, in no particular order
    async fn scan_all(&self) -> Result<Vec<ScanSummary>>;
}

/// Summaries sorted newest first, truncated to `limit` when given
pub async fn recent(store: &dyn HistoryStore, limit: Option<usize>) -> Result<Vec<ScanSummary>> {
    let mut summaries = store.scan_all().await?;
    summaries.sort_by(|a, b| b.scan_date.cmp(&a.scan_date));
    if let Some(limit) = limit {
        summaries.truncate(limit);
    }
    Ok(summaries)
}
