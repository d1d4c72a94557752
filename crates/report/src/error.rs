use thiserror::Error;

/// Publish-stage failure. The only error class allowed to surface as a
/// run-level error; results already computed are never lost to it.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("malformed row in {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("upload of {name} failed: {reason}")]
    Upload { name: String, reason: String },
}
