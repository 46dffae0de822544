//! Single source of truth for the active lesson plan session.
//!
//! Every mutation clones the current state, modifies the clone, and swaps it
//! in whole, so readers holding a snapshot never observe a half-applied
//! update. Subscribers are told about every change to the form data; they run
//! under the write lock and must not call back into the store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use utoipa::ToSchema;

use super::model::{
    toggle_tag, FormField, FormPatch, GraduateDimension, LessonPlanForm, PedagogicalPractice,
};
use super::validation::validate_for_generation;
use super::FormError;
use crate::suggestion::types::GeneratedContent;

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub form_data: LessonPlanForm,
    pub generated_content: Option<GeneratedContent>,
    pub generated_image_url: Option<String>,
    pub is_generating: bool,
    pub is_prefilling: bool,
    pub is_fetching_topics: bool,
    pub error: Option<String>,
}

/// Form data before and after a committed change.
#[derive(Debug, Clone)]
pub struct FormTransition {
    pub before: LessonPlanForm,
    pub after: LessonPlanForm,
}

impl FormTransition {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

pub type FormObserver = Box<dyn Fn(&LessonPlanForm) + Send + Sync>;

pub struct FormStore {
    state: RwLock<Arc<FormState>>,
    defaults: LessonPlanForm,
    observers: RwLock<Vec<FormObserver>>,
    topic_fetches: AtomicUsize,
}

impl FormStore {
    pub fn new(defaults: LessonPlanForm) -> Self {
        Self::with_draft(defaults, None)
    }

    /// Start from a recovered draft, falling back to `defaults`.
    pub fn with_draft(defaults: LessonPlanForm, draft: Option<LessonPlanForm>) -> Self {
        let mut form_data = draft.unwrap_or_else(|| defaults.clone());
        form_data.meeting_count = form_data.meeting_count.max(1);
        Self {
            state: RwLock::new(Arc::new(FormState {
                form_data,
                ..FormState::default()
            })),
            defaults,
            observers: RwLock::new(Vec::new()),
            topic_fetches: AtomicUsize::new(0),
        }
    }

    pub fn subscribe(&self, observer: FormObserver) {
        self.observers.write().push(observer);
    }

    pub fn snapshot(&self) -> Arc<FormState> {
        self.state.read().clone()
    }

    pub fn form(&self) -> LessonPlanForm {
        self.state.read().form_data.clone()
    }

    /// Apply `f` to a copy of the state and commit it.
    pub fn update<R>(&self, f: impl FnOnce(&mut FormState) -> R) -> R {
        let mut guard = self.state.write();
        let mut next = FormState::clone(&guard);
        let result = f(&mut next);

        let form_changed = next.form_data != guard.form_data;
        *guard = Arc::new(next);

        if form_changed {
            log::debug!("form data changed, notifying subscribers");
            for observer in self.observers.read().iter() {
                observer(&guard.form_data);
            }
        }

        result
    }

    fn update_form(&self, f: impl FnOnce(&mut LessonPlanForm)) -> FormTransition {
        self.update(|state| {
            let before = state.form_data.clone();
            f(&mut state.form_data);
            FormTransition {
                before,
                after: state.form_data.clone(),
            }
        })
    }

    pub fn update_field(&self, name: &str, value: &str) -> Result<FormTransition, FormError> {
        let field = FormField::parse(name).ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        Ok(self.update_form(|form| field.apply(form, value)))
    }

    pub fn toggle_pedagogy(&self, tag: PedagogicalPractice) -> FormTransition {
        self.update_form(|form| toggle_tag(&mut form.pedagogy, tag))
    }

    pub fn toggle_dimension(&self, tag: GraduateDimension) -> FormTransition {
        self.update_form(|form| toggle_tag(&mut form.dimensions, tag))
    }

    pub fn merge(&self, patch: &FormPatch) -> FormTransition {
        self.update_form(|form| patch.apply_to(form))
    }

    /// Back to the default form; generated output and errors are cleared.
    pub fn reset(&self) {
        let defaults = self.defaults.clone();
        self.update(|state| {
            *state = FormState {
                form_data: defaults,
                is_prefilling: state.is_prefilling,
                is_fetching_topics: state.is_fetching_topics,
                ..FormState::default()
            };
        });
    }

    /// Validate the current form and mark a full generation as running.
    /// Returns the exact form that passed validation.
    pub fn begin_generation(&self) -> Result<LessonPlanForm, FormError> {
        self.update(|state| {
            validate_for_generation(&state.form_data).map_err(FormError::Invalid)?;
            if state.is_generating {
                return Err(FormError::GenerationInProgress);
            }
            state.is_generating = true;
            state.error = None;
            Ok(state.form_data.clone())
        })
    }

    /// Commit content and illustration together, or record the failure.
    pub fn finish_generation(&self, outcome: Result<(GeneratedContent, Option<String>), String>) {
        self.update(|state| {
            state.is_generating = false;
            match outcome {
                Ok((content, image_url)) => {
                    state.generated_content = Some(content);
                    state.generated_image_url = image_url;
                }
                Err(message) => state.error = Some(message),
            }
        });
    }

    pub fn set_illustration(&self, image_url: Option<String>) {
        self.update(|state| state.generated_image_url = image_url);
    }

    /// Count a topic fetch as in flight until the guard is dropped.
    pub fn begin_topic_fetch(self: &Arc<Self>) -> TopicFetchGuard {
        self.update(|state| {
            self.topic_fetches.fetch_add(1, Ordering::SeqCst);
            state.is_fetching_topics = true;
        });
        TopicFetchGuard {
            store: Arc::clone(self),
        }
    }

    fn end_topic_fetch(&self) {
        self.update(|state| {
            let left = self.topic_fetches.fetch_sub(1, Ordering::SeqCst) - 1;
            state.is_fetching_topics = left > 0;
        });
    }

    pub fn set_error(&self, message: Option<String>) {
        self.update(|state| state.error = message);
    }
}

/// Clears `is_fetching_topics` once the last overlapping fetch ends,
/// including fetches abandoned mid-request.
pub struct TopicFetchGuard {
    store: Arc<FormStore>,
}

impl Drop for TopicFetchGuard {
    fn drop(&mut self) {
        self.store.end_topic_fetch();
    }
}
