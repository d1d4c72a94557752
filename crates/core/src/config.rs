use serde::{Deserialize, Serialize};

use crate::scheduler::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_CONCURRENCY};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub run: RunConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    /// Per-document fetch timeout; bounds how long one unresponsive symbol
    /// can stall its batch.
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub batch_size: usize,
    pub max_concurrency: usize,
    /// Cap on how many symbols are read from the universe; `None` reads all.
    pub symbol_limit: Option<usize>,
    pub universe_file: String,
    /// Download the universe file from the bucket before reading it.
    pub fetch_universe_from_bucket: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_dir: String,
    pub results_prefix: String,
    pub notfound_prefix: String,
    pub bucket: Option<String>,
    /// Bearer token for the object store; usually injected via
    /// `BORROWSCAN_OUTPUT__GCS_TOKEN`.
    pub gcs_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                base_url: "https://www.shortablestocks.com".to_string(),
                fetch_timeout_secs: 10,
            },
            run: RunConfig {
                batch_size: DEFAULT_BATCH_SIZE,
                max_concurrency: DEFAULT_MAX_CONCURRENCY,
                symbol_limit: None,
                universe_file: "NASDAQ_SYMBOL.csv".to_string(),
                fetch_universe_from_bucket: false,
            },
            output: OutputConfig {
                output_dir: ".".to_string(),
                results_prefix: "borrow_delta".to_string(),
                notfound_prefix: "not_found".to_string(),
                bucket: None,
                gcs_token: None,
            },
        }
    }
}
