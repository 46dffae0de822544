//! Submission checks for the lesson plan form.
//!
//! Errors are reported per field, in Indonesian, with a suggestion the UI can
//! show next to the offending input.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::LessonPlanForm;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn must_choose(field: &str, label: &str) -> Self {
        Self::new(field, "Wajib dipilih.")
            .with_suggestion(format!("Pilih {} terlebih dahulu", label.to_lowercase()))
    }

    pub fn must_fill(field: &str, label: &str) -> Self {
        Self::new(field, "Wajib diisi.")
            .with_suggestion(format!("Mohon isi {}", label.to_lowercase()))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "Validasi gagal: {} kesalahan ditemukan",
            self.errors.len()
        )];
        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }
        parts.join("\n")
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::must_fill(field, label));
    }
}

pub fn validate_selected(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::must_choose(field, label));
    }
}

/// Checks run before a full-content generation is submitted.
pub fn validate_for_generation(form: &LessonPlanForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    validate_selected(&form.subject, "subject", "Mata Pelajaran", &mut errors);
    validate_selected(&form.material, "material", "Materi", &mut errors);
    validate_required(&form.teacher_name, "teacherName", "Nama Guru", &mut errors);
    if form.meeting_count == 0 {
        errors.add(
            ValidationError::new("meetingCount", "Jumlah pertemuan minimal 1.")
                .with_suggestion("Isi jumlah pertemuan dengan angka 1 atau lebih"),
        );
    }

    errors.into_result()
}

/// Checks run before the current objectives are saved to the library.
pub fn validate_for_library(form: &LessonPlanForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    validate_required(&form.cp, "cp", "Capaian Pembelajaran", &mut errors);
    validate_required(&form.tp, "tp", "Tujuan Pembelajaran", &mut errors);
    errors.into_result()
}
