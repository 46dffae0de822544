//! Saved curriculum snippets (objectives per topic), kept across sessions.

pub mod routes;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::form::validation::{validate_for_library, ValidationErrors};
use crate::form::{FormPatch, LessonPlanForm};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{}", .0.summary())]
    Invalid(ValidationErrors),
    #[error("library entry {0} not found")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LibraryEntry {
    pub id: String,
    /// RFC 3339 save time
    pub timestamp: String,
    pub subject: String,
    pub grade: String,
    pub material: String,
    pub cp: String,
    pub tp: String,
}

impl LibraryEntry {
    pub fn from_form(form: &LessonPlanForm) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            subject: form.subject.clone(),
            grade: form.grade.clone(),
            material: form.material.clone(),
            cp: form.cp.clone(),
            tp: form.tp.clone(),
        }
    }

    /// The fields restored into the form when the entry is loaded.
    pub fn to_patch(&self) -> FormPatch {
        FormPatch {
            subject: Some(self.subject.clone()),
            grade: Some(self.grade.clone()),
            material: Some(self.material.clone()),
            cp: Some(self.cp.clone()),
            tp: Some(self.tp.clone()),
            ..FormPatch::default()
        }
    }

    fn matches(&self, keyword: &str) -> bool {
        self.material.to_lowercase().contains(keyword) || self.subject.to_lowercase().contains(keyword)
    }
}

pub type LibraryObserver = Box<dyn Fn(&[LibraryEntry]) + Send + Sync>;

/// Most-recent-first list of entries.
pub struct LibraryStore {
    entries: RwLock<Vec<LibraryEntry>>,
    observers: RwLock<Vec<LibraryObserver>>,
}

impl LibraryStore {
    pub fn new(entries: Vec<LibraryEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, observer: LibraryObserver) {
        self.observers.write().push(observer);
    }

    fn commit(&self, entries: &[LibraryEntry]) {
        for observer in self.observers.read().iter() {
            observer(entries);
        }
    }

    /// Save the form's objectives as a new entry at the front of the list.
    pub fn save(&self, form: &LessonPlanForm) -> Result<LibraryEntry, LibraryError> {
        validate_for_library(form).map_err(LibraryError::Invalid)?;

        let entry = LibraryEntry::from_form(form);
        let mut entries = self.entries.write();
        entries.insert(0, entry.clone());
        self.commit(&entries);

        log::info!("Saved library entry {} ({})", entry.id, entry.material);
        Ok(entry)
    }

    /// Remove exactly the entry with `id`.
    pub fn remove(&self, id: &str) -> Result<LibraryEntry, LibraryError> {
        let mut entries = self.entries.write();
        let pos = entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        let removed = entries.remove(pos);
        self.commit(&entries);

        log::info!("Removed library entry {}", id);
        Ok(removed)
    }

    /// Entries whose material or subject contains `keyword`, case-insensitively.
    pub fn list(&self, keyword: Option<&str>) -> Vec<LibraryEntry> {
        let entries = self.entries.read();
        match keyword.map(|k| k.trim().to_lowercase()).filter(|k| !k.is_empty()) {
            Some(keyword) => entries.iter().filter(|e| e.matches(&keyword)).cloned().collect(),
            None => entries.clone(),
        }
    }

    pub fn get(&self, id: &str) -> Result<LibraryEntry, LibraryError> {
        self.entries
            .read()
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }
}
