use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use utoipa::ToSchema;

use super::model::TagLabel;
use super::{
    FormError, FormPatch, FormState, GraduateDimension, LessonPlanForm, PedagogicalPractice,
};
use crate::suggestion::IllustrationFallback;
use crate::{AppState, ErrorResponse};

pub const GENERATION_FAILED: &str = "Gagal menghasilkan konten RPM.";

#[derive(Debug, Deserialize, ToSchema)]
pub struct FieldUpdate {
    /// camelCase field name, e.g. `material` or `meetingCount`
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Pedagogy,
    Dimension,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagToggle {
    pub kind: TagKind,
    /// Exact tag label
    pub label: String,
}

fn form_error_response(err: FormError) -> HttpResponse {
    match err {
        FormError::GenerationInProgress => {
            HttpResponse::Conflict().json(ErrorResponse::conflict(&err.to_string()))
        }
        FormError::Invalid(ref errors) => {
            HttpResponse::BadRequest().json(ErrorResponse::validation(errors))
        }
        FormError::UnknownField(_) | FormError::UnknownTag { .. } => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string()))
        }
    }
}

fn current(state: &AppState) -> HttpResponse {
    HttpResponse::Ok().json(FormState::clone(&state.form.snapshot()))
}

#[utoipa::path(
    get,
    path = "/api/form",
    tag = "Form",
    responses(
        (status = 200, description = "Current form state", body = FormState)
    )
)]
pub async fn get_form(state: web::Data<AppState>) -> impl Responder {
    current(&state)
}

#[utoipa::path(
    put,
    path = "/api/form/fields",
    tag = "Form",
    request_body = FieldUpdate,
    responses(
        (status = 200, description = "Field updated", body = FormState),
        (status = 400, description = "Unknown field", body = ErrorResponse)
    )
)]
pub async fn update_field(
    state: web::Data<AppState>,
    item: web::Json<FieldUpdate>,
) -> impl Responder {
    match state.form.update_field(&item.field, &item.value) {
        Ok(transition) => {
            if state.prefill.on_change(&transition) {
                log::info!("Objective prefill started for '{}'", transition.after.material);
            }
            current(&state)
        }
        Err(e) => form_error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/form/tags",
    tag = "Form",
    request_body = TagToggle,
    responses(
        (status = 200, description = "Tag toggled", body = FormState),
        (status = 400, description = "Unknown tag", body = ErrorResponse)
    )
)]
pub async fn toggle_tag(state: web::Data<AppState>, item: web::Json<TagToggle>) -> impl Responder {
    let unknown = |kind: &'static str| FormError::UnknownTag {
        kind,
        label: item.label.clone(),
    };

    let result = match item.kind {
        TagKind::Pedagogy => PedagogicalPractice::from_label(&item.label)
            .map(|tag| state.form.toggle_pedagogy(tag))
            .ok_or_else(|| unknown("pedagogy")),
        TagKind::Dimension => GraduateDimension::from_label(&item.label)
            .map(|tag| state.form.toggle_dimension(tag))
            .ok_or_else(|| unknown("dimension")),
    };

    match result {
        Ok(_) => current(&state),
        Err(e) => form_error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/form/merge",
    tag = "Form",
    request_body = FormPatch,
    responses(
        (status = 200, description = "Patch merged", body = FormState)
    )
)]
pub async fn merge_form(state: web::Data<AppState>, item: web::Json<FormPatch>) -> impl Responder {
    let transition = state.form.merge(&item);
    state.prefill.on_change(&transition);
    current(&state)
}

#[utoipa::path(
    post,
    path = "/api/form/reset",
    tag = "Form",
    responses(
        (status = 200, description = "Form reset to defaults", body = FormState)
    )
)]
pub async fn reset_form(state: web::Data<AppState>) -> impl Responder {
    state.form.reset();
    log::info!("Form reset to defaults");
    current(&state)
}

#[utoipa::path(
    post,
    path = "/api/form/generate",
    tag = "Form",
    responses(
        (status = 200, description = "Lesson content generated", body = FormState),
        (status = 400, description = "Form incomplete", body = ErrorResponse),
        (status = 409, description = "Generation already running", body = ErrorResponse),
        (status = 500, description = "Generation task aborted", body = ErrorResponse),
        (status = 502, description = "AI service failure", body = ErrorResponse)
    )
)]
pub async fn generate(state: web::Data<AppState>) -> impl Responder {
    let form = match state.form.begin_generation() {
        Ok(form) => form,
        Err(e) => return form_error_response(e),
    };

    log::info!(
        "Generating lesson plan for {} / {} ({} meetings)",
        form.subject,
        form.material,
        form.meeting_count
    );

    // Runs detached so the outcome is committed even if the client goes away.
    let task_state = state.clone();
    let task = tokio::spawn(async move { run_generation(&task_state, &form).await });

    match task.await {
        Ok(true) => current(&state),
        Ok(false) => HttpResponse::BadGateway().json(ErrorResponse::upstream(GENERATION_FAILED)),
        Err(e) => {
            log::error!("Lesson plan generation task aborted: {}", e);
            state.form.finish_generation(Err(GENERATION_FAILED.to_string()));
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(GENERATION_FAILED))
        }
    }
}

/// Content and illustration in parallel, committed together.
async fn run_generation(state: &AppState, form: &LessonPlanForm) -> bool {
    let (content, image_url) = tokio::join!(
        state.suggestions.generate_full_content(form),
        state
            .suggestions
            .generate_illustration(&form.material, IllustrationFallback::Placeholder)
    );

    match content {
        Ok(content) => {
            state.form.finish_generation(Ok((content, image_url)));
            true
        }
        Err(e) => {
            log::error!("Lesson plan generation failed: {}", e);
            state.form.finish_generation(Err(GENERATION_FAILED.to_string()));
            false
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/form/illustration",
    tag = "Form",
    responses(
        (status = 200, description = "Illustration refreshed (may be empty)", body = FormState),
        (status = 400, description = "No material selected", body = ErrorResponse)
    )
)]
pub async fn refresh_illustration(state: web::Data<AppState>) -> impl Responder {
    let material = state.form.form().material;
    if material.trim().is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request("Materi belum dipilih."));
    }

    let image_url = state
        .suggestions
        .generate_illustration(&material, IllustrationFallback::Nothing)
        .await;
    state.form.set_illustration(image_url);
    current(&state)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/form").route(web::get().to(get_form)))
        .service(web::resource("/form/fields").route(web::put().to(update_field)))
        .service(web::resource("/form/tags").route(web::post().to(toggle_tag)))
        .service(web::resource("/form/merge").route(web::post().to(merge_form)))
        .service(web::resource("/form/reset").route(web::post().to(reset_form)))
        .service(web::resource("/form/generate").route(web::post().to(generate)))
        .service(web::resource("/form/illustration").route(web::post().to(refresh_illustration)));
}
