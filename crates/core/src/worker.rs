//! Batch worker: processes one contiguous slice of the symbol universe.
//!
//! Per-symbol state machine: Fetching -> {Parsing -> Filtering -> Reducing
//! -> Recorded} | NotFound. Every per-symbol failure is contained here; a
//! batch always runs to completion over all its assigned symbols. One
//! malformed document must never drop the remaining symbols in its batch.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::{BatchOutcome, SymbolResult};
use crate::reducer;
use crate::scheduler::CancelFlag;
use crate::traits::{AvailabilityProvider, FetchError, ProviderFactory};
use crate::window::{self, DocumentError};

/// Why one symbol was downgraded to not-found.
#[derive(Debug, Error)]
enum SymbolFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Malformed(#[from] DocumentError),
}

async fn process_symbol(
    provider: &dyn AvailabilityProvider,
    symbol: &str,
) -> Result<SymbolResult, SymbolFailure> {
    let rows = provider.fetch(symbol).await?;
    let window = window::derive_window(&rows)?;
    let filtered = window::filter_window(&rows, window);
    Ok(reducer::reduce(symbol, &filtered))
}

/// Runs one batch to completion and returns its private outcome buffer.
///
/// The provider is acquired here and dropped when the function returns,
/// regardless of how any symbol fared. If no provider can be acquired at
/// all, every symbol in the batch is recorded as not-found rather than
/// failing the batch. Cancellation stops new fetches before the next
/// symbol; symbols already recorded stay in the buffer.
pub async fn process_batch(
    batch_num: usize,
    symbols: Vec<String>,
    factory: Arc<dyn ProviderFactory>,
    cancel: CancelFlag,
) -> BatchOutcome {
    info!("Starting batch {} ({} symbols)", batch_num, symbols.len());
    let mut outcome = BatchOutcome::default();

    let provider = match factory.create().await {
        Ok(provider) => provider,
        Err(e) => {
            error!("Batch {} could not acquire a provider: {}", batch_num, e);
            outcome.not_found.extend(symbols);
            return outcome;
        }
    };

    for symbol in symbols {
        if cancel.is_cancelled() {
            info!("Batch {} cancelled, skipping remaining symbols", batch_num);
            break;
        }
        match process_symbol(provider.as_ref(), &symbol).await {
            Ok(result) => outcome.results.push(result),
            Err(reason) => {
                warn!("Symbol {} recorded as not found: {}", symbol, reason);
                outcome.not_found.push(symbol);
            }
        }
    }

    info!(
        "Batch {} completed: {} resolved, {} not found",
        batch_num,
        outcome.results.len(),
        outcome.not_found.len()
    );
    outcome
}
