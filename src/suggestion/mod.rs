//! Content suggestion client: schema-constrained calls to the generative AI
//! backend and typed parsing of their responses.
//!
//! - `client` - one request function per generation type
//! - `gemini` - HTTP backend for the Gemini `generateContent` API
//! - `schema` - response schemas and required-field checks
//! - `prompts` - instruction text for each call
//! - `types` - typed response values

pub mod client;
pub mod gemini;
pub mod prompts;
pub mod routes;
pub mod schema;
pub mod types;

pub use client::{IllustrationFallback, SuggestionClient};
pub use gemini::GeminiBackend;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("request to the AI service failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("AI service responded with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("AI service returned no content")]
    EmptyResponse,
    #[error("AI response is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),
    #[error("AI response does not match the expected schema: {0}")]
    SchemaViolation(String),
}

impl SuggestionError {
    /// Failures caused by the response body rather than the transport.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::MalformedJson(_) | Self::SchemaViolation(_))
    }
}

/// Inline image returned by the image model.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

impl InlineImage {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Seam between the request functions and the transport.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Run a JSON-constrained generation and return the raw response text.
    async fn generate_json(
        &self,
        model: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, SuggestionError>;

    /// Run an image generation; `Ok(None)` when the response has no image part.
    async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<Option<InlineImage>, SuggestionError>;
}
