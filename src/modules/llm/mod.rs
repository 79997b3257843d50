//! Generative-language model client
//!
//! The query feature talks to the model through [`TextModel`]: one prompt
//! string in, plain text out.

mod gemini_client;

pub use gemini_client::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model request failed: {0}")]
    Request(String),

    #[error("Model API returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Failed to parse model response: {0}")]
    Parse(String),

    #[error("Model returned no text: {0}")]
    EmptyResponse(String),
}

#[async_trait]
pub trait TextModel: Send + Sync {
    /// Send one prompt and return the model's raw text
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}
