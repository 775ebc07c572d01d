use super::VisionService;
use crate::models::InlineImage;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Vision failure modes a test can script.
#[derive(Debug, Clone)]
pub enum MockVisionFailure {
    Invocation(String),
    EmptyCompletion,
}

pub struct MockVisionClient {
    responses: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<MockVisionFailure>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, failure: MockVisionFailure) -> Self {
        *self.failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionService for MockVisionClient {
    async fn analyze(&self, prompt: &str, _image: &InlineImage) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        match self.failure.lock().unwrap().clone() {
            Some(MockVisionFailure::Invocation(message)) => {
                return Err(Error::ModelInvocation(message));
            }
            Some(MockVisionFailure::EmptyCompletion) => return Err(Error::EmptyCompletion),
            None => {}
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response
            Ok(format!("Mock analysis for: {}", prompt))
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}
