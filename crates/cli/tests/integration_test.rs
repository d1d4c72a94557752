use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;

use borrowscan_core::models::{RawRow, RawSeries};
use borrowscan_core::traits::{AvailabilityProvider, FetchError, ProviderFactory};
use borrowscan_core::{BatchScheduler, MIN_SERIES_ROWS};
use borrowscan_report::{csv_writer, ResultPublisher};

/// Provider covering the full taxonomy: resolvable symbols, a timeout, and
/// a malformed (too short) document.
struct PipelineProvider;

fn overnight_series() -> RawSeries {
    let mut rows = vec![
        RawRow::new("90", "2024-01-03 08:00:00"),
        RawRow::new("100", "2024-01-02 17:50:00"),
    ];
    while rows.len() < MIN_SERIES_ROWS {
        rows.push(RawRow::new("1", "2024-01-02 12:00:00"));
    }
    rows
}

#[async_trait]
impl AvailabilityProvider for PipelineProvider {
    async fn fetch(&self, symbol: &str) -> Result<RawSeries, FetchError> {
        match symbol {
            "BBB" => Err(FetchError::Timeout),
            "MAL" => Ok(vec![RawRow::new("5", "2024-01-03 08:00:00"); 10]),
            _ => Ok(overnight_series()),
        }
    }
}

struct PipelineFactory;

#[async_trait]
impl ProviderFactory for PipelineFactory {
    async fn create(&self) -> anyhow::Result<Box<dyn AvailabilityProvider>> {
        Ok(Box::new(PipelineProvider))
    }
}

#[tokio::test]
async fn scheduler_to_published_csv_round_trip() {
    let symbols: Vec<String> = vec!["AAA", "BBB", "CCC", "MAL", "DDD"]
        .into_iter()
        .map(String::from)
        .collect();

    let scheduler = BatchScheduler::new(Arc::new(PipelineFactory), 2, 4);
    let result_set = scheduler.run(symbols).await;

    // 5 symbols in, 5 accounted for: 3 resolved, 2 not found.
    assert_eq!(result_set.results.len(), 3);
    assert_eq!(
        result_set.not_found,
        BTreeSet::from(["BBB".to_string(), "MAL".to_string()])
    );
    assert!(result_set.results.iter().all(|r| r.delta == 10));

    let dir = tempfile::tempdir().unwrap();
    let publisher = ResultPublisher::new(dir.path(), "borrow_delta", "not_found");
    let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
    let files = publisher.publish(&result_set, date).await.unwrap();

    let reread = csv_writer::read_results(&files.results_path).unwrap();
    assert_eq!(reread, result_set.results);
    let reread_not_found = csv_writer::read_not_found(&files.not_found_path).unwrap();
    assert_eq!(reread_not_found, result_set.not_found);
}
