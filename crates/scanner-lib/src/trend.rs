//! Day-over-day trend of total monthly waste
//!
//! The comparison point is the most recent scan dated strictly before the
//! current scan date. History read failures degrade to "no history".

use crate::history::HistoryStore;
use crate::models::{HistoryOperation, ScanSummary, ScanWarning, TrendResult};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Distinct-date records needed before a trend is reported
pub const MIN_RECORDS_FOR_TREND: usize = 2;

pub struct TrendAnalyzer {
    history: Arc<dyn HistoryStore>,
}

impl TrendAnalyzer {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self { history }
    }

    /// Compare against history as of today (UTC)
    pub async fn compare(&self, current_total: Decimal) -> TrendResult {
        self.compare_on(Utc::now().date_naive(), current_total)
            .await
            .0
    }

    /// Compare against history as of `scan_date`.
    ///
    /// A failed history read yields a no-history trend plus a warning.
    pub async fn compare_on(
        &self,
        scan_date: NaiveDate,
        current_total: Decimal,
    ) -> (TrendResult, Option<ScanWarning>) {
        match self.history.scan_all().await {
            Ok(records) => (from_history(&records, scan_date, current_total), None),
            Err(e) => {
                warn!(error = %e, "Could not read scan history, trend unavailable");
                (
                    TrendResult::no_history(current_total),
                    Some(ScanWarning::PersistenceFailure {
                        operation: HistoryOperation::Read,
                        reason: format!("{:#}", e),
                    }),
                )
            }
        }
    }
}

/// Pure trend computation over a set of history records.
///
/// Records are deduplicated by date (latest `scan_timestamp` wins). With fewer
/// than [`MIN_RECORDS_FOR_TREND`] distinct dates, or no date before
/// `scan_date`, the previous total is absent.
pub fn from_history(
    records: &[ScanSummary],
    scan_date: NaiveDate,
    current_total: Decimal,
) -> TrendResult {
    let mut by_date: BTreeMap<NaiveDate, &ScanSummary> = BTreeMap::new();
    for record in records {
        by_date
            .entry(record.scan_date)
            .and_modify(|existing| {
                if record.scan_timestamp > existing.scan_timestamp {
                    *existing = record;
                }
            })
            .or_insert(record);
    }

    if by_date.len() < MIN_RECORDS_FOR_TREND {
        debug!(records = by_date.len(), "Not enough history for a trend");
        return TrendResult::no_history(current_total);
    }

    let previous = by_date
        .range(..scan_date)
        .next_back()
        .map(|(_, summary)| summary.total_monthly_savings);

    TrendResult::new(current_total, previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::InMemoryHistoryStore;
    use crate::models::TrendDirection;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
    }

    fn record(date: NaiveDate, total: Decimal) -> ScanSummary {
        ScanSummary {
            scan_date: date,
            scan_timestamp: at(date, 6),
            findings: Vec::new(),
            total_monthly_savings: total,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    struct UnreadableHistory;

    #[async_trait]
    impl HistoryStore for UnreadableHistory {
        async fn put(&self, _summary: &ScanSummary) -> Result<()> {
            Ok(())
        }

        async fn scan_all(&self) -> Result<Vec<ScanSummary>> {
            anyhow::bail!("scan timed out")
        }
    }

    #[test]
    fn test_previous_is_most_recent_prior_date() {
        let d = today();
        let records = vec![
            record(d - Duration::days(2), dec!(10.00)),
            record(d - Duration::days(1), dec!(8.29)),
            record(d, dec!(8.29)),
        ];

        let trend = from_history(&records, d, dec!(8.29));
        assert_eq!(trend.previous_total, Some(dec!(8.29)));
        assert_eq!(trend.delta, dec!(0.00));
        assert_eq!(trend.delta_percent, dec!(0));
        assert_eq!(trend.direction(), TrendDirection::Unchanged);
    }

    #[test]
    fn test_order_of_records_does_not_matter() {
        let d = today();
        let records = vec![
            record(d, dec!(5.00)),
            record(d - Duration::days(7), dec!(1.00)),
            record(d - Duration::days(3), dec!(10.00)),
        ];

        let trend = from_history(&records, d, dec!(5.00));
        assert_eq!(trend.previous_total, Some(dec!(10.00)));
        assert_eq!(trend.delta, dec!(-5.00));
        assert_eq!(trend.delta_percent, dec!(-50.00));
        assert_eq!(trend.direction(), TrendDirection::Improved);
    }

    #[test]
    fn test_fewer_than_two_records_is_absent() {
        let d = today();
        let trend = from_history(&[], d, dec!(3.00));
        assert_eq!(trend.previous_total, None);

        let trend = from_history(&[record(d, dec!(3.00))], d, dec!(3.00));
        assert_eq!(trend.previous_total, None);
        assert_eq!(trend.delta, Decimal::ZERO);
        assert_eq!(trend.delta_percent, Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_dates_count_once() {
        let d = today();
        let mut late = record(d, dec!(4.00));
        late.scan_timestamp = at(d, 20);

        let trend = from_history(&[record(d, dec!(3.00)), late], d, dec!(4.00));
        assert_eq!(trend.previous_total, None);
    }

    #[test]
    fn test_missing_today_record_still_uses_prior_date() {
        let d = today();
        let records = vec![
            record(d - Duration::days(2), dec!(10.00)),
            record(d - Duration::days(1), dec!(8.00)),
        ];

        let trend = from_history(&records, d, dec!(12.00));
        assert_eq!(trend.previous_total, Some(dec!(8.00)));
        assert_eq!(trend.delta, dec!(4.00));
        assert_eq!(trend.delta_percent, dec!(50.00));
    }

    #[test]
    fn test_zero_previous_total_has_zero_percent() {
        let d = today();
        let records = vec![record(d - Duration::days(1), dec!(0.00)), record(d, dec!(2.00))];

        let trend = from_history(&records, d, dec!(2.00));
        assert_eq!(trend.previous_total, Some(dec!(0.00)));
        assert_eq!(trend.delta, dec!(2.00));
        assert_eq!(trend.delta_percent, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_compare_reads_store() {
        let d = today();
        let store = Arc::new(InMemoryHistoryStore::with_records([
            record(d - Duration::days(1), dec!(20.00)),
            record(d, dec!(15.00)),
        ]));
        let analyzer = TrendAnalyzer::new(store);

        let (trend, warning) = analyzer.compare_on(d, dec!(15.00)).await;
        assert!(warning.is_none());
        assert_eq!(trend.previous_total, Some(dec!(20.00)));
        assert_eq!(trend.delta_percent, dec!(-25.00));
    }

    #[tokio::test]
    async fn test_read_failure_is_no_history() {
        let analyzer = TrendAnalyzer::new(Arc::new(UnreadableHistory));

        let (trend, warning) = analyzer.compare_on(today(), dec!(7.00)).await;
        assert_eq!(trend.previous_total, None);
        assert_eq!(trend.current_total, dec!(7.00));
        assert!(matches!(
            warning,
            Some(ScanWarning::PersistenceFailure {
                operation: HistoryOperation::Read,
                ..
            })
        ));

        let trend = analyzer.compare(dec!(7.00)).await;
        assert_eq!(trend.previous_total, None);
    }
}
