use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One parsed availability sample for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityPoint {
    pub available: u64,
    pub updated_at: NaiveDateTime,
}

/// One table row as handed over by the retrieval collaborator.
///
/// Cell text is kept verbatim: `available` is a thousands-separated integer
/// string, `updated` a `YYYY-MM-DD HH:MM:SS` timestamp string. Number and
/// timestamp parsing happen in the core so malformed cells are handled under
/// the per-symbol error taxonomy, not in the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub available: String,
    pub updated: String,
}

impl RawRow {
    pub fn new(available: impl Into<String>, updated: impl Into<String>) -> Self {
        Self {
            available: available.into(),
            updated: updated.into(),
        }
    }
}

/// Row series for one symbol, in source (ascending row) order.
pub type RawSeries = Vec<RawRow>;

/// Anchor dates bounding the overnight comparison window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceWindow {
    pub today_anchor: NaiveDate,
    pub previous_anchor: NaiveDate,
}

/// Final output for one successfully processed symbol.
///
/// `latest_yesterday` is the oldest sample inside the overnight window (the
/// last reading of the previous evening), `earliest_today` the newest (the
/// first reading of the current morning). Both are `None` when the window
/// contained no samples, in which case `delta` is 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolResult {
    pub symbol: String,
    pub delta: i64,
    pub latest_yesterday: Option<AvailabilityPoint>,
    pub earliest_today: Option<AvailabilityPoint>,
}

/// Private per-worker buffer, merged by the scheduler after all batches join.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<SymbolResult>,
    pub not_found: Vec<String>,
}

/// Aggregate output of one scheduler run.
///
/// `results` is deliberately unsorted: batch completion order is
/// nondeterministic, and ordering-sensitive consumers must sort explicitly.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub results: Vec<SymbolResult>,
    pub not_found: BTreeSet<String>,
}

impl ResultSet {
    pub fn merge(&mut self, outcome: BatchOutcome) {
        self.results.extend(outcome.results);
        self.not_found.extend(outcome.not_found);
    }
}
