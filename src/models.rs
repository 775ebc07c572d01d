//! Data models and structures
//!
//! Defines the wire shapes of the analyze endpoint, the inline media part
//! handed to the model provider, and process-wide configuration.

use serde::{Deserialize, Serialize};

/// Inbound body of `POST /api/analyze`. All three fields are required and
/// must be non-empty for the pipeline to run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub mime_type: String,
}

impl AnalyzeRequest {
    /// True when every required field carries a value.
    pub fn is_complete(&self) -> bool {
        !self.image_url.is_empty() && !self.prompt.is_empty() && !self.mime_type.is_empty()
    }
}

/// Successful analysis payload.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
}

/// Uniform failure shape across all pipeline stages.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Base64 image payload paired with its declared media type.
///
/// The media type is taken verbatim from the request; the bytes are never
/// sniffed, so a mismatch between the two is the caller's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub data: String,
    pub mime_type: String,
}

impl InlineImage {
    /// Encode raw image bytes for inline transmission. Pure and
    /// deterministic; performs no validation of the bytes.
    pub fn encode(bytes: &[u8], mime_type: &str) -> Self {
        use base64::Engine as _;

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: mime_type.to_string(),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Read configuration from the environment, failing fast when the model
    /// credential is absent. Called once at startup, before the listener
    /// binds; a missing key must never surface on the first request instead.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let port = match std::env::var("UILENS_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| crate::Error::Config(format!("Invalid UILENS_PORT '{}'", raw)))?,
            Err(_) => 3000,
        };

        Ok(Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .map_err(|_| crate::Error::Config("GEMINI_API_KEY not set".to_string()))?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            host: std::env::var("UILENS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
        })
    }
}
