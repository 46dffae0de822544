use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{ChapterInfo, GeneratedContent, ObjectiveSuggestion, PromesEntry, ProtaEntry};
use super::{prompts, schema, GenerativeBackend, SuggestionError};
use crate::config::ModelConfig;
use crate::form::LessonPlanForm;
use crate::program::semester_months;

/// What an illustration request yields when the image call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllustrationFallback {
    /// Deterministic placeholder image seeded by the topic.
    Placeholder,
    Nothing,
}

#[derive(Clone)]
pub struct SuggestionClient {
    backend: Arc<dyn GenerativeBackend>,
    models: ModelConfig,
    placeholder_base: String,
}

impl SuggestionClient {
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        models: ModelConfig,
        placeholder_base: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            models,
            placeholder_base: placeholder_base.into(),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        model: &str,
        prompt: &str,
        schema: Value,
    ) -> Result<T, SuggestionError> {
        let raw = self.backend.generate_json(model, prompt, &schema).await?;
        parse_response(&raw, &schema)
    }

    /// Chapters and materials for the semester. Never fails: any error is
    /// logged and an empty list returned.
    pub async fn list_topics(
        &self,
        subject: &str,
        grade: &str,
        search: Option<&str>,
    ) -> Vec<ChapterInfo> {
        let prompt = prompts::topics(subject, grade, search);
        match self
            .request::<Vec<ChapterInfo>>(&self.models.text, &prompt, schema::topics())
            .await
        {
            Ok(chapters) => chapters,
            Err(e) => {
                log::warn!("Topic list for {} / {} unavailable: {}", subject, grade, e);
                Vec::new()
            }
        }
    }

    pub async fn suggest_objectives(
        &self,
        subject: &str,
        material: &str,
        grade: &str,
    ) -> Result<ObjectiveSuggestion, SuggestionError> {
        let prompt = prompts::objectives(subject, material, grade);
        self.request(&self.models.text, &prompt, schema::objectives())
            .await
    }

    /// Full lesson content; the meeting count must match the form.
    pub async fn generate_full_content(
        &self,
        form: &LessonPlanForm,
    ) -> Result<GeneratedContent, SuggestionError> {
        let prompt = prompts::lesson_content(form);
        let content: GeneratedContent = self
            .request(&self.models.content, &prompt, schema::lesson_content())
            .await?;

        let expected = form.meeting_count as usize;
        if content.meetings.len() != expected {
            return Err(SuggestionError::SchemaViolation(format!(
                "$.meetings: expected {} meetings, got {}",
                expected,
                content.meetings.len()
            )));
        }

        for (i, meeting) in content.meetings.iter().enumerate() {
            if let Some(activity) = meeting.blank_steps() {
                return Err(SuggestionError::SchemaViolation(format!(
                    "$.meetings[{i}].{activity}.steps: must not be blank"
                )));
            }
        }

        Ok(content)
    }

    pub async fn generate_illustration(
        &self,
        topic: &str,
        fallback: IllustrationFallback,
    ) -> Option<String> {
        let prompt = prompts::illustration(topic);
        match self.backend.generate_image(&self.models.image, &prompt).await {
            Ok(image) => image.map(|img| img.to_data_url()),
            Err(e) => {
                log::warn!("Illustration for '{}' failed: {}", topic, e);
                match fallback {
                    IllustrationFallback::Placeholder => self.placeholder_url(topic),
                    IllustrationFallback::Nothing => None,
                }
            }
        }
    }

    /// `<base>/seed/<topic>/800/450` with the topic percent-encoded.
    pub fn placeholder_url(&self, topic: &str) -> Option<String> {
        let mut url = reqwest::Url::parse(&self.placeholder_base).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["seed", topic, "800", "450"]);
        Some(url.to_string())
    }

    pub async fn generate_annual_program(
        &self,
        subject: &str,
        grade: &str,
    ) -> Result<Vec<ProtaEntry>, SuggestionError> {
        let prompt = prompts::annual_program(subject, grade);
        self.request(&self.models.text, &prompt, schema::annual_program())
            .await
    }

    pub async fn generate_semester_program(
        &self,
        subject: &str,
        grade: &str,
        semester: u8,
    ) -> Result<Vec<PromesEntry>, SuggestionError> {
        let codes: Vec<&str> = semester_months(semester).iter().map(|m| m.code).collect();
        let prompt = prompts::semester_program(subject, grade, semester, &codes);
        self.request(&self.models.text, &prompt, schema::semester_program())
            .await
    }
}

/// Parse raw response text: JSON syntax, then schema, then typed shape.
pub fn parse_response<T: DeserializeOwned>(raw: &str, schema: &Value) -> Result<T, SuggestionError> {
    let value: Value = serde_json::from_str(raw.trim()).map_err(SuggestionError::MalformedJson)?;
    schema::check(&value, schema).map_err(SuggestionError::SchemaViolation)?;
    serde_json::from_value(value).map_err(|e| SuggestionError::SchemaViolation(e.to_string()))
}
