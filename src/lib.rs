//! uilens - AI critique of webpage screenshots
//!
//! Exposes a single HTTP endpoint that fetches a remote image, wraps it into
//! an inline media part, and asks a multimodal generative model for a textual
//! analysis under a fixed, non-negotiable content-moderation policy.

pub mod ai;
pub mod error;
pub mod fetch;
pub mod models;
pub mod server;

pub use error::{Error, Result};
