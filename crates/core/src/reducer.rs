//! Collapses a filtered series to the overnight delta for one symbol.

use crate::models::{AvailabilityPoint, SymbolResult};

/// Reduces a filtered, newest-first series to a [`SymbolResult`].
///
/// The series is ordered descending, so its last element is the final
/// reading of the previous evening (latest yesterday) and its first element
/// the first reading of the current morning (earliest today). The delta is
/// latest-yesterday minus earliest-today.
///
/// An empty window yields delta 0 with both endpoints absent, mirroring the
/// reference behavior; the symbol still counts as resolved. A window
/// collapsed to a single sample yields delta 0 with both endpoints equal,
/// which is a meaningful output, not an error.
pub fn reduce(symbol: &str, filtered: &[AvailabilityPoint]) -> SymbolResult {
    match (filtered.last(), filtered.first()) {
        (Some(latest_yesterday), Some(earliest_today)) => SymbolResult {
            symbol: symbol.to_string(),
            delta: latest_yesterday.available as i64 - earliest_today.available as i64,
            latest_yesterday: Some(*latest_yesterday),
            earliest_today: Some(*earliest_today),
        },
        _ => SymbolResult {
            symbol: symbol.to_string(),
            delta: 0,
            latest_yesterday: None,
            earliest_today: None,
        },
    }
}
