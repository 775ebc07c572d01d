//! AI service integration for multimodal image analysis
//!
//! Abstracts the model call behind a capability trait so the concrete
//! upstream provider stays swappable and mockable; the Gemini adapter is the
//! only live implementation.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiVisionClient;
pub use mock::MockVisionClient;

use crate::models::InlineImage;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait VisionService: Send + Sync {
    /// Ask the model to critique `image` according to `prompt`, returning the
    /// completion's text verbatim.
    async fn analyze(&self, prompt: &str, image: &InlineImage) -> Result<String>;
}
