//! CSV row-set formatting for the two output files.
//!
//! Results file columns: `Symbol,Difference,latest_yesterday,
//! latest_yesterday_available,earliest_today,earliest_today_available`.
//! Not-found file: a single `Symbol` column. Formatting is lossless for
//! integers and timestamps so downstream consumers can re-parse the files.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::{Reader, Writer};

use borrowscan_core::models::{AvailabilityPoint, SymbolResult};

use crate::error::PublishError;

pub const RESULTS_HEADER: [&str; 6] = [
    "Symbol",
    "Difference",
    "latest_yesterday",
    "latest_yesterday_available",
    "earliest_today",
    "earliest_today_available",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn io_error(path: &Path, source: std::io::Error) -> PublishError {
    PublishError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn timestamp_cell(point: Option<&AvailabilityPoint>) -> String {
    point.map_or_else(String::new, |p| {
        p.updated_at.format(TIMESTAMP_FORMAT).to_string()
    })
}

fn available_cell(point: Option<&AvailabilityPoint>) -> String {
    // An empty window defaults to 0, matching the reference output.
    point.map_or_else(|| "0".to_string(), |p| p.available.to_string())
}

/// Writes the per-symbol results row-set.
///
/// # Errors
/// Returns [`PublishError`] if the file cannot be created or a row fails to
/// serialize.
pub fn write_results(path: &Path, results: &[SymbolResult]) -> Result<(), PublishError> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(RESULTS_HEADER)?;
    for result in results {
        writer.write_record(&[
            result.symbol.clone(),
            result.delta.to_string(),
            timestamp_cell(result.latest_yesterday.as_ref()),
            available_cell(result.latest_yesterday.as_ref()),
            timestamp_cell(result.earliest_today.as_ref()),
            available_cell(result.earliest_today.as_ref()),
        ])?;
    }
    writer.flush().map_err(|e| io_error(path, e))?;
    Ok(())
}

/// Writes the not-found row-set.
///
/// # Errors
/// Returns [`PublishError`] if the file cannot be created or a row fails to
/// serialize.
pub fn write_not_found(path: &Path, not_found: &BTreeSet<String>) -> Result<(), PublishError> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(["Symbol"])?;
    for symbol in not_found {
        writer.write_record([symbol.as_str()])?;
    }
    writer.flush().map_err(|e| io_error(path, e))?;
    Ok(())
}

fn parse_point(
    path: &Path,
    timestamp: &str,
    available: &str,
) -> Result<Option<AvailabilityPoint>, PublishError> {
    if timestamp.is_empty() {
        return Ok(None);
    }
    let updated_at = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).map_err(|e| {
        PublishError::Parse {
            path: path.display().to_string(),
            reason: format!("bad timestamp '{timestamp}': {e}"),
        }
    })?;
    let available = available.parse::<u64>().map_err(|e| PublishError::Parse {
        path: path.display().to_string(),
        reason: format!("bad available count '{available}': {e}"),
    })?;
    Ok(Some(AvailabilityPoint {
        available,
        updated_at,
    }))
}

/// Re-parses a results row-set written by [`write_results`].
///
/// # Errors
/// Returns [`PublishError`] if the file cannot be read or a cell fails to
/// parse.
pub fn read_results(path: &Path) -> Result<Vec<SymbolResult>, PublishError> {
    let mut reader = Reader::from_path(path)?;
    let mut results = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).unwrap_or("").to_string();
        let delta = cell(1).parse::<i64>().map_err(|e| PublishError::Parse {
            path: path.display().to_string(),
            reason: format!("bad difference '{}': {e}", cell(1)),
        })?;
        results.push(SymbolResult {
            symbol: cell(0),
            delta,
            latest_yesterday: parse_point(path, &cell(2), &cell(3))?,
            earliest_today: parse_point(path, &cell(4), &cell(5))?,
        });
    }
    Ok(results)
}

/// Re-parses a not-found row-set written by [`write_not_found`].
///
/// # Errors
/// Returns [`PublishError`] if the file cannot be read.
pub fn read_not_found(path: &Path) -> Result<BTreeSet<String>, PublishError> {
    let mut reader = Reader::from_path(path)?;
    let mut symbols = BTreeSet::new();
    for record in reader.records() {
        let record = record?;
        if let Some(symbol) = record.get(0) {
            symbols.insert(symbol.to_string());
        }
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(available: u64, updated: &str) -> AvailabilityPoint {
        AvailabilityPoint {
            available,
            updated_at: NaiveDateTime::parse_from_str(updated, TIMESTAMP_FORMAT).unwrap(),
        }
    }

    #[test]
    fn results_round_trip_is_lossless() {
        let results = vec![
            SymbolResult {
                symbol: "AAA".to_string(),
                delta: 10,
                latest_yesterday: Some(point(100, "2024-01-02 17:50:00")),
                earliest_today: Some(point(90, "2024-01-03 08:00:00")),
            },
            SymbolResult {
                symbol: "NEG".to_string(),
                delta: -42,
                latest_yesterday: Some(point(8, "2024-01-02 23:59:59")),
                earliest_today: Some(point(50, "2024-01-03 00:00:01")),
            },
            SymbolResult {
                symbol: "EMPTY".to_string(),
                delta: 0,
                latest_yesterday: None,
                earliest_today: None,
            },
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("borrow_delta_2024-01-03.csv");
        write_results(&path, &results).unwrap();
        let reread = read_results(&path).unwrap();
        assert_eq!(reread, results);
    }

    #[test]
    fn results_header_matches_reference_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_results(&path, &[]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents.lines().next().unwrap(),
            "Symbol,Difference,latest_yesterday,latest_yesterday_available,earliest_today,earliest_today_available"
        );
    }

    #[test]
    fn not_found_round_trip_is_lossless() {
        let not_found: BTreeSet<String> =
            ["BBB", "ZZZ"].iter().map(|s| s.to_string()).collect();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_found_2024-01-03.csv");
        write_not_found(&path, &not_found).unwrap();
        assert_eq!(read_not_found(&path).unwrap(), not_found);
    }
}
