use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{LibraryEntry, LibraryError};
use crate::form::FormState;
use crate::{AppState, ErrorResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListParams {
    /// Case-insensitive match on material or subject
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteParams {
    /// Must be `true` to delete
    #[serde(default)]
    pub confirm: bool,
}

fn library_error_response(err: LibraryError) -> HttpResponse {
    match err {
        LibraryError::Invalid(ref errors) => {
            HttpResponse::BadRequest().json(ErrorResponse::validation(errors))
        }
        LibraryError::NotFound(_) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found(&err.to_string()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/library",
    tag = "Library",
    params(ListParams),
    responses(
        (status = 200, description = "Saved entries, most recent first", body = Vec<LibraryEntry>)
    )
)]
pub async fn list_entries(
    state: web::Data<AppState>,
    query: web::Query<ListParams>,
) -> impl Responder {
    HttpResponse::Ok().json(state.library.list(query.keyword.as_deref()))
}

#[utoipa::path(
    post,
    path = "/api/library",
    tag = "Library",
    responses(
        (status = 201, description = "Current objectives saved", body = LibraryEntry),
        (status = 400, description = "Objectives are empty", body = ErrorResponse)
    )
)]
pub async fn save_entry(state: web::Data<AppState>) -> impl Responder {
    match state.library.save(&state.form.form()) {
        Ok(entry) => HttpResponse::Created().json(entry),
        Err(e) => library_error_response(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/library/{id}",
    tag = "Library",
    params(
        ("id" = String, Path, description = "Entry ID"),
        DeleteParams
    ),
    responses(
        (status = 200, description = "Entry deleted", body = LibraryEntry),
        (status = 400, description = "Deletion not confirmed", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    )
)]
pub async fn delete_entry(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DeleteParams>,
) -> impl Responder {
    if !query.confirm {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Hapus? Konfirmasi dengan confirm=true."));
    }

    match state.library.remove(&path) {
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(e) => library_error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/library/{id}/load",
    tag = "Library",
    params(
        ("id" = String, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry merged into the form", body = FormState),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    )
)]
pub async fn load_entry(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let entry = match state.library.get(&path) {
        Ok(entry) => entry,
        Err(e) => return library_error_response(e),
    };

    let transition = state.form.merge(&entry.to_patch());
    state.prefill.on_change(&transition);
    log::info!("Loaded library entry {} into the form", entry.id);

    HttpResponse::Ok().json(FormState::clone(&state.form.snapshot()))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/library")
            .route(web::get().to(list_entries))
            .route(web::post().to(save_entry)),
    )
    .service(web::resource("/library/{id}").route(web::delete().to(delete_entry)))
    .service(web::resource("/library/{id}/load").route(web::post().to(load_entry)));
}
