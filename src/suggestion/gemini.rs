//! Gemini `generateContent` backend (API key based).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{GenerativeBackend, InlineImage, SuggestionError};
use crate::config::GeminiConfig;

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(client: Client, config: &GeminiConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn post(&self, model: &str, body: &Value) -> Result<Value, SuggestionError> {
        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(self.endpoint(model))
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        log::info!(
            "Gemini {} responded {} in {} ms",
            model,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SuggestionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(SuggestionError::MalformedJson)
    }
}

fn content_parts(response: &Value) -> Option<&Vec<Value>> {
    response["candidates"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|c| c["content"]["parts"].as_array())
}

/// Concatenate the text parts of the first candidate.
pub fn extract_text(response: &Value) -> Option<String> {
    let text: String = content_parts(response)?
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

/// First inline image part of the first candidate.
pub fn extract_inline_image(response: &Value) -> Option<InlineImage> {
    content_parts(response)?.iter().find_map(|part| {
        let inline = part.get("inlineData")?;
        let data = inline["data"].as_str()?;
        Some(InlineImage {
            mime_type: inline["mimeType"]
                .as_str()
                .unwrap_or("image/png")
                .to_string(),
            data: data.to_string(),
        })
    })
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate_json(
        &self,
        model: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, SuggestionError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        });

        let response = self.post(model, &body).await?;
        extract_text(&response).ok_or(SuggestionError::EmptyResponse)
    }

    async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<Option<InlineImage>, SuggestionError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": "16:9" }
            }
        });

        let response = self.post(model, &body).await?;
        Ok(extract_inline_image(&response))
    }
}
