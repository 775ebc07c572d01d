//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Image URL unreachable or answered with a non-success status. Carries
    /// the upstream status text (for example "Not Found").
    #[error("Failed to fetch image from URL: {0}")]
    ResourceFetch(String),

    /// Any upstream failure from the model provider: quota, transport,
    /// safety refusal. Deliberately undifferentiated; the upstream error
    /// taxonomy is not ours to invent.
    #[error("Model invocation error: {0}")]
    ModelInvocation(String),

    /// The model answered but produced no extractable text (for example a
    /// completion fully blocked by moderation).
    #[error("Model returned a completion with no text")]
    EmptyCompletion,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The upstream message to surface in the HTTP `details` field.
    ///
    /// For fetch failures this is exactly the upstream status text; for model
    /// failures the provider's message. Other variants fall back to their
    /// display form.
    pub fn details(&self) -> String {
        match self {
            Error::ResourceFetch(status) => status.clone(),
            Error::ModelInvocation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_fetch_details_is_bare_status_text() {
        let err = Error::ResourceFetch("Not Found".to_string());
        assert_eq!(err.details(), "Not Found");
        assert!(err.to_string().contains("Failed to fetch image"));
    }

    #[test]
    fn test_model_invocation_details_is_upstream_message() {
        let err = Error::ModelInvocation("quota exceeded".to_string());
        assert_eq!(err.details(), "quota exceeded");
    }

    #[test]
    fn test_empty_completion_details_falls_back_to_display() {
        let err = Error::EmptyCompletion;
        assert_eq!(err.details(), err.to_string());
    }
}
