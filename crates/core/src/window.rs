//! Overnight-window derivation and filtering.
//!
//! The comparison window for a symbol is anchored on two dates read from the
//! raw series itself: the date of the first row ("today") and the date of the
//! row 41 positions later ("previous trading day"). Samples count as
//! overnight when they fall in the inclusive range from previous-day 17:45
//! to today 08:05.
//!
//! Both functions are pure and never consult a live clock, so the filter is
//! testable with fixed fixtures and behaves identically across timezones.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::models::{AvailabilityPoint, RawRow, ReferenceWindow};

/// Row index whose date becomes the "today" anchor.
pub const TODAY_ANCHOR_ROW: usize = 0;
/// Row index whose date becomes the "previous trading day" anchor.
pub const PREVIOUS_ANCHOR_ROW: usize = 41;
/// Minimum number of rows a series needs before anchors can be trusted.
pub const MIN_SERIES_ROWS: usize = 43;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a raw series cannot produce a reference window.
///
/// Every variant maps to a not-found symbol; none of them may abort a batch.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document has {0} rows, need at least {MIN_SERIES_ROWS}")]
    TooFewRows(usize),
    #[error("anchor date '{0}' could not be parsed")]
    BadAnchor(String),
    #[error("previous anchor {previous} is not before today anchor {today}")]
    AnchorsOutOfOrder {
        previous: NaiveDate,
        today: NaiveDate,
    },
}

fn anchor_date(row: &RawRow) -> Result<NaiveDate, DocumentError> {
    let date_part = row
        .updated
        .split_whitespace()
        .next()
        .unwrap_or(row.updated.as_str());
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|_| DocumentError::BadAnchor(row.updated.clone()))
}

/// Derives the reference window from a raw series.
///
/// # Errors
/// Returns a [`DocumentError`] if the series is too short, either anchor
/// date fails to parse, or the anchors are not in chronological order.
pub fn derive_window(rows: &[RawRow]) -> Result<ReferenceWindow, DocumentError> {
    if rows.len() < MIN_SERIES_ROWS {
        return Err(DocumentError::TooFewRows(rows.len()));
    }
    let today_anchor = anchor_date(&rows[TODAY_ANCHOR_ROW])?;
    let previous_anchor = anchor_date(&rows[PREVIOUS_ANCHOR_ROW])?;
    if previous_anchor >= today_anchor {
        return Err(DocumentError::AnchorsOutOfOrder {
            previous: previous_anchor,
            today: today_anchor,
        });
    }
    Ok(ReferenceWindow {
        today_anchor,
        previous_anchor,
    })
}

fn bounds(window: ReferenceWindow) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let lower = window.previous_anchor.and_hms_opt(0, 0, 0)?
        + Duration::hours(17)
        + Duration::minutes(45);
    let upper = window.today_anchor.and_hms_opt(0, 0, 0)? + Duration::hours(8) + Duration::minutes(5);
    Some((lower, upper))
}

fn parse_point(row: &RawRow) -> Option<AvailabilityPoint> {
    let updated_at = NaiveDateTime::parse_from_str(row.updated.trim(), TIMESTAMP_FORMAT).ok()?;
    let available = row.available.trim().replace(',', "").parse::<u64>().ok()?;
    Some(AvailabilityPoint {
        available,
        updated_at,
    })
}

/// Keeps the samples inside the overnight window, newest first.
///
/// Rows with unparseable timestamps or counts are dropped silently; they
/// never fail the symbol. The sort is stable, so samples with equal
/// timestamps keep their source row order across runs.
pub fn filter_window(rows: &[RawRow], window: ReferenceWindow) -> Vec<AvailabilityPoint> {
    let Some((lower, upper)) = bounds(window) else {
        return Vec::new();
    };
    let mut kept: Vec<AvailabilityPoint> = rows
        .iter()
        .filter_map(parse_point)
        .filter(|point| point.updated_at >= lower && point.updated_at <= upper)
        .collect();
    kept.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(available: &str, updated: &str) -> RawRow {
        RawRow::new(available, updated)
    }

    /// 43-row series: the given head rows first, then filler rows dated on
    /// the previous anchor day at noon (outside the overnight window).
    fn series_with_head(head: Vec<RawRow>) -> Vec<RawRow> {
        let mut rows = head;
        while rows.len() < MIN_SERIES_ROWS {
            rows.push(row("1", "2024-01-02 12:00:00"));
        }
        rows
    }

    #[test]
    fn derives_anchors_from_first_and_42nd_row() {
        let rows = series_with_head(vec![row("90", "2024-01-03 08:00:00")]);
        let window = derive_window(&rows).unwrap();
        assert_eq!(
            window.today_anchor,
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
        );
        assert_eq!(
            window.previous_anchor,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn short_series_is_unresolvable() {
        let rows: Vec<RawRow> = (0..10).map(|_| row("5", "2024-01-03 08:00:00")).collect();
        assert!(matches!(
            derive_window(&rows),
            Err(DocumentError::TooFewRows(10))
        ));
    }

    #[test]
    fn unparseable_anchor_is_unresolvable() {
        let rows = series_with_head(vec![row("90", "not a date")]);
        assert!(matches!(
            derive_window(&rows),
            Err(DocumentError::BadAnchor(_))
        ));
    }

    #[test]
    fn reversed_anchors_are_unresolvable() {
        let mut rows = series_with_head(vec![row("90", "2024-01-01 08:00:00")]);
        rows[PREVIOUS_ANCHOR_ROW] = row("1", "2024-01-02 12:00:00");
        assert!(matches!(
            derive_window(&rows),
            Err(DocumentError::AnchorsOutOfOrder { .. })
        ));
    }

    fn window() -> ReferenceWindow {
        ReferenceWindow {
            today_anchor: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            previous_anchor: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let rows = vec![
            row("10", "2024-01-02 17:45:00"),
            row("20", "2024-01-03 08:05:00"),
            row("30", "2024-01-02 17:44:59"),
            row("40", "2024-01-03 08:05:01"),
        ];
        let filtered = filter_window(&rows, window());
        let values: Vec<u64> = filtered.iter().map(|p| p.available).collect();
        assert_eq!(values, vec![20, 10]);
    }

    #[test]
    fn output_is_sorted_non_increasing() {
        let rows = vec![
            row("1", "2024-01-02 18:00:00"),
            row("2", "2024-01-03 07:00:00"),
            row("3", "2024-01-02 22:30:00"),
            row("4", "2024-01-03 01:15:00"),
        ];
        let filtered = filter_window(&rows, window());
        assert!(filtered
            .windows(2)
            .all(|pair| pair[0].updated_at >= pair[1].updated_at));
        assert_eq!(filtered.len(), 4);
    }

    #[test]
    fn malformed_rows_are_dropped_not_fatal() {
        let rows = vec![
            row("1,234", "2024-01-02 18:00:00"),
            row("oops", "2024-01-02 19:00:00"),
            row("5", "yesterday-ish"),
        ];
        let filtered = filter_window(&rows, window());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].available, 1234);
    }

    #[test]
    fn equal_timestamps_keep_source_order() {
        let rows = vec![
            row("1", "2024-01-02 18:00:00"),
            row("2", "2024-01-02 18:00:00"),
            row("3", "2024-01-02 18:00:00"),
        ];
        let filtered = filter_window(&rows, window());
        let values: Vec<u64> = filtered.iter().map(|p| p.available).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
