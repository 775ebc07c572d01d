//! Remote image retrieval
//!
//! Fetches the raw bytes of the screenshot URL named in an analyze request.
//! Every call is a fresh fetch: images may change between analyses, so
//! freshness wins over efficiency and there is no cache or retry.

pub mod client;
pub mod mock;

pub use client::HttpImageFetcher;
pub use mock::MockImageFetcher;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
