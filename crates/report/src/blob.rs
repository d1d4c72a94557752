//! Google Cloud Storage client over the JSON/upload HTTP API.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use borrowscan_core::traits::BlobStore;

const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

pub struct GcsClient {
    http_client: reqwest::Client,
    endpoint: String,
    bucket: String,
    token: String,
}

impl GcsClient {
    #[must_use]
    pub fn new(bucket: String, token: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            bucket,
            token,
        }
    }

    /// Points the client at a different endpoint (fake GCS in tests).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    fn upload_url(&self, name: &str) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.endpoint, self.bucket, name
        )
    }

    fn download_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}?alt=media",
            self.endpoint, self.bucket, name
        )
    }
}

#[async_trait]
impl BlobStore for GcsClient {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<()> {
        let response = self
            .http_client
            .post(self.upload_url(name))
            .bearer_auth(&self.token)
            .header("content-type", "text/csv")
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("Upload request for '{name}' failed"))?;

        if !response.status().is_success() {
            bail!("Upload of '{}' rejected with status {}", name, response.status());
        }
        Ok(())
    }

    async fn download(&self, name: &str) -> Result<Vec<u8>> {
        let response = self
            .http_client
            .get(self.download_url(name))
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Download request for '{name}' failed"))?;

        if !response.status().is_success() {
            bail!(
                "Download of '{}' rejected with status {}",
                name,
                response.status()
            );
        }
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of '{name}'"))?;
        Ok(bytes.to_vec())
    }
}
