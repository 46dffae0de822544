use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use utoipa::ToSchema;

use super::{ProgramKind, ProgramState};
use crate::{AppState, ErrorResponse};

const BUSY: &str = "Program sedang dibuat.";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SemesterRequest {
    /// 1 (ganjil) or 2 (genap); defaults to 2
    pub semester: Option<u8>,
}

/// Response for a detached program generation task.
fn settle(
    state: &AppState,
    joined: Result<bool, tokio::task::JoinError>,
    kind: ProgramKind,
) -> HttpResponse {
    match joined {
        Ok(true) => HttpResponse::Ok().json(state.programs.snapshot()),
        Ok(false) => {
            HttpResponse::BadGateway().json(ErrorResponse::upstream(kind.failure_message()))
        }
        Err(e) => {
            log::error!("Program generation task aborted: {}", e);
            state.programs.fail(kind);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(kind.failure_message()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/programs",
    tag = "Programs",
    responses(
        (status = 200, description = "Current program views", body = ProgramState)
    )
)]
pub async fn get_programs(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.programs.snapshot())
}

#[utoipa::path(
    post,
    path = "/api/programs/annual",
    tag = "Programs",
    responses(
        (status = 200, description = "Annual program generated", body = ProgramState),
        (status = 409, description = "A program is already being generated", body = ErrorResponse),
        (status = 502, description = "AI service failure", body = ErrorResponse)
    )
)]
pub async fn generate_annual(state: web::Data<AppState>) -> impl Responder {
    if !state.programs.begin() {
        return HttpResponse::Conflict().json(ErrorResponse::conflict(BUSY));
    }

    let task_state = state.clone();
    let task = tokio::spawn(async move {
        let form = task_state.form.form();
        match task_state
            .suggestions
            .generate_annual_program(&form.subject, &form.grade)
            .await
        {
            Ok(entries) => {
                log::info!("Annual program for {} has {} rows", form.subject, entries.len());
                task_state.programs.finish_annual(entries);
                true
            }
            Err(e) => {
                log::error!("Annual program generation failed: {}", e);
                task_state.programs.fail(ProgramKind::Annual);
                false
            }
        }
    });

    settle(&state, task.await, ProgramKind::Annual)
}

#[utoipa::path(
    post,
    path = "/api/programs/semester",
    tag = "Programs",
    request_body = SemesterRequest,
    responses(
        (status = 200, description = "Semester program generated", body = ProgramState),
        (status = 400, description = "Invalid semester", body = ErrorResponse),
        (status = 409, description = "A program is already being generated", body = ErrorResponse),
        (status = 502, description = "AI service failure", body = ErrorResponse)
    )
)]
pub async fn generate_semester(
    state: web::Data<AppState>,
    item: Option<web::Json<SemesterRequest>>,
) -> impl Responder {
    let semester = item.and_then(|r| r.semester).unwrap_or(2);
    if !(1..=2).contains(&semester) {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Semester harus 1 atau 2."));
    }

    if !state.programs.begin() {
        return HttpResponse::Conflict().json(ErrorResponse::conflict(BUSY));
    }

    let task_state = state.clone();
    let task = tokio::spawn(async move {
        let form = task_state.form.form();
        match task_state
            .suggestions
            .generate_semester_program(&form.subject, &form.grade, semester)
            .await
        {
            Ok(entries) => {
                log::info!(
                    "Semester {} program for {} has {} rows",
                    semester,
                    form.subject,
                    entries.len()
                );
                task_state.programs.finish_semester(semester, entries);
                true
            }
            Err(e) => {
                log::error!("Semester program generation failed: {}", e);
                task_state.programs.fail(ProgramKind::Semester);
                false
            }
        }
    });

    settle(&state, task.await, ProgramKind::Semester)
}

#[utoipa::path(
    delete,
    path = "/api/programs",
    tag = "Programs",
    responses(
        (status = 200, description = "Program views closed", body = ProgramState)
    )
)]
pub async fn close_programs(state: web::Data<AppState>) -> impl Responder {
    state.programs.clear();
    HttpResponse::Ok().json(state.programs.snapshot())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/programs")
            .route(web::get().to(get_programs))
            .route(web::delete().to(close_programs)),
    )
    .service(web::resource("/programs/annual").route(web::post().to(generate_annual)))
    .service(web::resource("/programs/semester").route(web::post().to(generate_semester)));
}
