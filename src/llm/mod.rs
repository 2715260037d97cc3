//! Text-generation client module.
//!
//! This module provides a trait-based abstraction over text-generation
//! providers, with Google Gemini as the primary implementation.
//!
//! A provider turns a prompt into text or fails with an [`LlmError`]. Callers
//! never inspect raw provider responses.

mod error;
mod gemini;

pub use error::{classify_http_status, LlmError, LlmErrorKind};
pub use gemini::{GeminiClient, ModelInfo, GEMINI_API_URL};

use async_trait::async_trait;

/// Trait for text-generation providers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt`. Exactly one request is made per call.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
