use crate::models::RawSeries;
use async_trait::async_trait;
use thiserror::Error;

/// Retrieval failure for one symbol. Every variant is contained inside the
/// batch worker and downgrades the symbol to not-found.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no availability table found")]
    NotFound,
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
}

/// Retrieval collaborator: fetches the parsed availability table for one
/// symbol. Markup handling is entirely the implementor's concern; the core
/// only sees cell text.
#[async_trait]
pub trait AvailabilityProvider: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<RawSeries, FetchError>;
}

/// Creates one provider per batch worker.
///
/// Each worker owns its provider (and whatever session or connection pool it
/// carries) for the lifetime of the batch; the instance is dropped when the
/// worker finishes, on every exit path.
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    async fn create(&self) -> anyhow::Result<Box<dyn AvailabilityProvider>>;
}

/// Ordered ticker-symbol source, capped at a caller-specified count.
#[async_trait]
pub trait SymbolUniverse: Send + Sync {
    async fn symbols(&self, limit: Option<usize>) -> anyhow::Result<Vec<String>>;
}

/// Remote object store keyed by filename.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> anyhow::Result<()>;
    async fn download(&self, name: &str) -> anyhow::Result<Vec<u8>>;
}
