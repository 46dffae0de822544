//! Automatic objective prefill.
//!
//! When the (subject, grade, material) triple changes while the objectives
//! are still blank, the orchestrator asks the suggestion client for
//! objectives and merges them into the form, filling only what is still
//! empty. Every request is tagged with its triple and a ticket: a result for
//! a triple the form has moved away from is dropped, and only the most
//! recently started request clears the prefilling flag.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::form::tags::normalize_tags;
use crate::form::{FormStore, FormTransition, GraduateDimension, LessonPlanForm, PedagogicalPractice, PrefillKey};
use crate::suggestion::types::ObjectiveSuggestion;
use crate::suggestion::{SuggestionClient, SuggestionError};

pub const PREFILL_FAILED: &str = "Gagal memproses data otomatis dari AI.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefillOutcome {
    Applied,
    /// The form moved on to another triple before the result arrived
    Discarded,
    Failed,
}

/// The triple to prefill for, if this change should start a prefill.
pub fn should_trigger(transition: &FormTransition) -> Option<PrefillKey> {
    let key = transition.after.prefill_key();
    if key == transition.before.prefill_key() {
        return None;
    }

    let form = &transition.after;
    if form.subject.trim().is_empty() || form.material.trim().is_empty() {
        return None;
    }
    if !form.has_blank_objectives() {
        return None;
    }

    Some(key)
}

/// Fill-if-absent merge of a suggestion into the form.
pub fn merge_suggestion(form: &mut LessonPlanForm, suggestion: &ObjectiveSuggestion) {
    if form.cp.trim().is_empty() {
        form.cp = suggestion.cp.trim().to_string();
    }
    if form.tp.trim().is_empty() {
        form.tp = suggestion.numbered_goals();
    }

    let pedagogy: Vec<PedagogicalPractice> = normalize_tags(&suggestion.suggested_pedagogy);
    if form.pedagogy.is_empty() && !pedagogy.is_empty() {
        form.pedagogy = pedagogy;
    }

    let dimensions: Vec<GraduateDimension> = normalize_tags(&suggestion.dimensions);
    if form.dimensions.is_empty() && !dimensions.is_empty() {
        form.dimensions = dimensions;
    }

    if let Some(count) = suggestion.meeting_count() {
        form.meeting_count = count;
    }
}

pub struct PrefillOrchestrator {
    store: Arc<FormStore>,
    client: SuggestionClient,
    latest: AtomicU64,
}

impl PrefillOrchestrator {
    pub fn new(store: Arc<FormStore>, client: SuggestionClient) -> Self {
        Self {
            store,
            client,
            latest: AtomicU64::new(0),
        }
    }

    /// Start a background prefill if `transition` calls for one.
    pub fn on_change(self: &Arc<Self>, transition: &FormTransition) -> bool {
        let Some(key) = should_trigger(transition) else {
            return false;
        };

        let ticket = self.begin(&key);
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.fetch_and_apply(ticket, key).await;
        });
        true
    }

    /// Run a prefill for `key` to completion.
    pub async fn run(&self, key: PrefillKey) -> PrefillOutcome {
        let ticket = self.begin(&key);
        self.fetch_and_apply(ticket, key).await
    }

    fn begin(&self, key: &PrefillKey) -> u64 {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!(
            "prefill #{} started for {} / {} / {}",
            ticket,
            key.subject,
            key.grade,
            key.material
        );
        self.store.update(|state| {
            state.is_prefilling = true;
            state.error = None;
        });
        ticket
    }

    async fn fetch_and_apply(&self, ticket: u64, key: PrefillKey) -> PrefillOutcome {
        let result = self
            .client
            .suggest_objectives(&key.subject, &key.material, &key.grade)
            .await;
        self.complete(ticket, &key, result)
    }

    fn complete(
        &self,
        ticket: u64,
        key: &PrefillKey,
        result: Result<ObjectiveSuggestion, SuggestionError>,
    ) -> PrefillOutcome {
        let outcome = self.store.update(|state| {
            if self.latest.load(Ordering::SeqCst) == ticket {
                state.is_prefilling = false;
            }
            if state.form_data.prefill_key() != *key {
                return PrefillOutcome::Discarded;
            }
            match &result {
                Ok(suggestion) => {
                    merge_suggestion(&mut state.form_data, suggestion);
                    PrefillOutcome::Applied
                }
                Err(_) => {
                    state.error = Some(PREFILL_FAILED.to_string());
                    PrefillOutcome::Failed
                }
            }
        });

        match (&outcome, &result) {
            (PrefillOutcome::Failed, Err(e)) => log::warn!("prefill #{} failed: {}", ticket, e),
            (PrefillOutcome::Discarded, _) => log::debug!("prefill #{} discarded as stale", ticket),
            _ => log::debug!("prefill #{} applied", ticket),
        }

        outcome
    }
}
