use super::ImageFetcher;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches image bytes over HTTP with a bounded per-request timeout.
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self::new_with_client(Client::new())
    }

    pub fn new_with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Fetching image from {}", url);

        let response = self
            .client
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch image from {}: {}", url, e);
                Error::ResourceFetch(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map_or_else(|| status.as_str().to_string(), str::to_string);
            tracing::error!("Image fetch returned {} for {}", status, url);
            return Err(Error::ResourceFetch(status_text));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::ResourceFetch(e.to_string()))?;
        tracing::debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
