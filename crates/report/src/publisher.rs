//! Result publisher: formats the aggregates as two date-stamped CSV files
//! and optionally pushes them to the object store.
//!
//! Publishing is the only stage allowed to surface a run-level error, and it
//! runs after all processing has completed, so computed results are never
//! lost to a publish failure. An upload failure leaves the local files in
//! place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use borrowscan_core::models::ResultSet;
use borrowscan_core::traits::BlobStore;

use crate::csv_writer;
use crate::error::PublishError;

#[derive(Debug, Clone)]
pub struct PublishedFiles {
    pub results_path: PathBuf,
    pub not_found_path: PathBuf,
}

pub struct ResultPublisher {
    output_dir: PathBuf,
    results_prefix: String,
    notfound_prefix: String,
    blob: Option<Arc<dyn BlobStore>>,
}

impl ResultPublisher {
    #[must_use]
    pub fn new(
        output_dir: impl Into<PathBuf>,
        results_prefix: impl Into<String>,
        notfound_prefix: impl Into<String>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            results_prefix: results_prefix.into(),
            notfound_prefix: notfound_prefix.into(),
            blob: None,
        }
    }

    #[must_use]
    pub fn with_blob_store(mut self, blob: Arc<dyn BlobStore>) -> Self {
        self.blob = Some(blob);
        self
    }

    /// Writes both row-sets and uploads them when a store is configured.
    ///
    /// # Errors
    /// Returns [`PublishError`] on local write or upload failure; the local
    /// files written so far are kept either way.
    pub async fn publish(
        &self,
        set: &ResultSet,
        date: NaiveDate,
    ) -> Result<PublishedFiles, PublishError> {
        let stamp = date.format("%Y-%m-%d");
        let results_name = format!("{}_{}.csv", self.results_prefix, stamp);
        let not_found_name = format!("{}_{}.csv", self.notfound_prefix, stamp);
        let results_path = self.output_dir.join(&results_name);
        let not_found_path = self.output_dir.join(&not_found_name);

        csv_writer::write_results(&results_path, &set.results)?;
        info!(
            "Output written to {} ({} rows)",
            results_path.display(),
            set.results.len()
        );
        csv_writer::write_not_found(&not_found_path, &set.not_found)?;
        info!(
            "Not-found symbols written to {} ({} rows)",
            not_found_path.display(),
            set.not_found.len()
        );

        if let Some(blob) = &self.blob {
            upload_file(blob.as_ref(), &results_name, &results_path).await?;
            upload_file(blob.as_ref(), &not_found_name, &not_found_path).await?;
            info!("Output files uploaded to the object store");
        }

        Ok(PublishedFiles {
            results_path,
            not_found_path,
        })
    }
}

async fn upload_file(
    blob: &dyn BlobStore,
    name: &str,
    path: &Path,
) -> Result<(), PublishError> {
    let bytes = std::fs::read(path).map_err(|e| PublishError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    blob.upload(name, bytes)
        .await
        .map_err(|e| PublishError::Upload {
            name: name.to_string(),
            reason: e.to_string(),
        })
}
