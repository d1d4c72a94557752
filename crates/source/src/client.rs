//! HTTP retrieval collaborator for the shortablestocks availability pages.
//!
//! All markup handling lives here: the core only ever sees cell text. The
//! page carries the borrow table inside `div#borrowdata`; each data row has
//! the Available count in its third cell and the Updated timestamp in its
//! fourth.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use borrowscan_core::models::{RawRow, RawSeries};
use borrowscan_core::traits::{AvailabilityProvider, FetchError, ProviderFactory};

/// Cell positions within one borrow-table row.
const AVAILABLE_CELL: usize = 2;
const UPDATED_CELL: usize = 3;

pub struct ShortableStocksClient {
    http_client: reqwest::Client,
    base_url: String,
    table_re: Regex,
    row_re: Regex,
    cell_re: Regex,
    tag_re: Regex,
}

impl ShortableStocksClient {
    /// Builds a client with its own connection pool and a bounded
    /// per-request timeout.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            table_re: Regex::new(
                r#"(?s)<div[^>]*id="borrowdata".*?<table[^>]*>(.*?)</table>"#,
            )?,
            row_re: Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>")?,
            cell_re: Regex::new(r"(?s)<td[^>]*>(.*?)</td>")?,
            tag_re: Regex::new(r"<[^>]+>")?,
        })
    }

    fn cell_text(&self, markup: &str) -> String {
        self.tag_re.replace_all(markup, "").trim().to_string()
    }

    /// Extracts the borrow table's data rows; `None` when the page carries
    /// no usable table. Header rows use `<th>` cells and fall out naturally.
    fn parse_rows(&self, body: &str) -> Option<RawSeries> {
        let table = self.table_re.captures(body)?.get(1)?.as_str();
        let mut rows = Vec::new();
        for row in self.row_re.captures_iter(table) {
            let cells: Vec<String> = self
                .cell_re
                .captures_iter(row.get(1).map_or("", |m| m.as_str()))
                .filter_map(|c| c.get(1).map(|m| self.cell_text(m.as_str())))
                .collect();
            if cells.len() <= UPDATED_CELL {
                continue;
            }
            rows.push(RawRow::new(
                cells[AVAILABLE_CELL].clone(),
                cells[UPDATED_CELL].clone(),
            ));
        }
        if rows.is_empty() {
            None
        } else {
            Some(rows)
        }
    }
}

#[async_trait]
impl AvailabilityProvider for ShortableStocksClient {
    async fn fetch(&self, symbol: &str) -> Result<RawSeries, FetchError> {
        let url = format!("{}/?{}", self.base_url, symbol);
        debug!("Fetching availability page: {}", url);
        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !response.status().is_success() {
            return Err(FetchError::Transport(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        self.parse_rows(&body).ok_or(FetchError::NotFound)
    }
}

/// Builds one [`ShortableStocksClient`] per batch worker, so no HTTP session
/// is ever shared across workers.
pub struct ShortableStocksFactory {
    base_url: String,
    timeout: Duration,
}

impl ShortableStocksFactory {
    #[must_use]
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self { base_url, timeout }
    }
}

#[async_trait]
impl ProviderFactory for ShortableStocksFactory {
    async fn create(&self) -> anyhow::Result<Box<dyn AvailabilityProvider>> {
        Ok(Box::new(ShortableStocksClient::new(
            self.base_url.clone(),
            self.timeout,
        )?))
    }
}
