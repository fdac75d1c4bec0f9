//! AI autocomplete for codepair.
//!
//! A single-shot relay: a buffer snapshot and language identifier in, one
//! continuation suggestion out. No session state, no retry, no fallback;
//! provider failures propagate to the caller as-is.

pub mod gemini;

use async_trait::async_trait;

pub use gemini::{GeminiClient, GeminiConfig};

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// One round trip to the provider. Returns the first candidate's
    /// suggestion text, trimmed; empty string when the provider returns
    /// no candidates.
    async fn complete(&self, code: &str, language: &str) -> Result<String, AiError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}
