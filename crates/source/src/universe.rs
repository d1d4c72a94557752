//! Symbol universe read from a local CSV file (column `Symbol`), order
//! preserved, optionally capped.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use borrowscan_core::traits::SymbolUniverse;

pub struct CsvSymbolUniverse {
    path: PathBuf,
}

impl CsvSymbolUniverse {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Reads ticker symbols from the `Symbol` column, in file order.
///
/// # Errors
/// Returns an error if the file cannot be opened, has no `Symbol` column,
/// or a record fails to parse.
pub fn read_symbols(path: &Path, limit: Option<usize>) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open universe file: {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h == "Symbol")
        .with_context(|| format!("No 'Symbol' column in {}", path.display()))?;

    let cap = limit.unwrap_or(usize::MAX);
    let mut symbols = Vec::new();
    for record in reader.records() {
        if symbols.len() >= cap {
            break;
        }
        let record = record?;
        if let Some(symbol) = record.get(column) {
            let symbol = symbol.trim();
            if !symbol.is_empty() {
                symbols.push(symbol.to_string());
            }
        }
    }
    Ok(symbols)
}

#[async_trait]
impl SymbolUniverse for CsvSymbolUniverse {
    async fn symbols(&self, limit: Option<usize>) -> Result<Vec<String>> {
        read_symbols(&self.path, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn universe_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn reads_symbols_in_order() {
        let file = universe_file("Symbol,Name\nAAPL,Apple\nMSFT,Microsoft\nTSLA,Tesla\n");
        let universe = CsvSymbolUniverse::new(file.path());
        let symbols = universe.symbols(None).await.unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "TSLA"]);
    }

    #[tokio::test]
    async fn limit_caps_the_universe() {
        let file = universe_file("Symbol\nAAA\nBBB\nCCC\nDDD\n");
        let universe = CsvSymbolUniverse::new(file.path());
        let symbols = universe.symbols(Some(2)).await.unwrap();
        assert_eq!(symbols, vec!["AAA", "BBB"]);
    }

    #[tokio::test]
    async fn missing_symbol_column_is_an_error() {
        let file = universe_file("Ticker\nAAA\n");
        let universe = CsvSymbolUniverse::new(file.path());
        assert!(universe.symbols(None).await.is_err());
    }
}
