use super::ImageFetcher;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scriptable fetcher for tests: queued byte responses or a forced failure,
/// plus a call counter so tests can assert a fetch never happened.
pub struct MockImageFetcher {
    responses: Arc<Mutex<Vec<Vec<u8>>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageFetcher {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, bytes: Vec<u8>) -> Self {
        self.responses.lock().unwrap().push(bytes);
        self
    }

    /// Make every fetch fail with the given upstream status text.
    pub fn with_failure(self, status_text: &str) -> Self {
        *self.failure.lock().unwrap() = Some(status_text.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        if let Some(status_text) = self.failure.lock().unwrap().clone() {
            return Err(Error::ResourceFetch(status_text));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response: PNG magic bytes.
            Ok(vec![0x89, 0x50, 0x4E, 0x47])
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}
