//! Lesson plan form: data model, state store, validation and HTTP routes.

pub mod model;
pub mod routes;
pub mod store;
pub mod tags;
pub mod validation;

pub use model::{FormPatch, GraduateDimension, LessonPlanForm, PedagogicalPractice, PrefillKey};
pub use store::{FormState, FormStore, FormTransition};

use thiserror::Error;

use validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("unknown form field '{0}'")]
    UnknownField(String),
    #[error("unknown {kind} tag '{label}'")]
    UnknownTag { kind: &'static str, label: String },
    #[error("a lesson plan is already being generated")]
    GenerationInProgress,
    #[error("{}", .0.summary())]
    Invalid(ValidationErrors),
}
