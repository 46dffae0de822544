use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{
    build_document, export_document, ExportError, ExportTarget, ExportedFile, PdfExporter, PdfMode,
    PrintExporter, RenderedDocument, WordExporter,
};
use crate::render::html::render_page;
use crate::{AppState, ErrorResponse};

#[derive(Debug, Deserialize)]
pub struct TargetPath {
    pub target: ExportTarget,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PdfParams {
    /// `download` (default) or `preview`
    #[serde(default)]
    pub mode: PdfMode,
}

fn current_document(state: &AppState, target: ExportTarget) -> Option<RenderedDocument> {
    build_document(
        target,
        &state.form.snapshot(),
        &state.programs.snapshot(),
        &state.render_context(),
    )
}

fn file_response(file: ExportedFile) -> HttpResponse {
    let disposition = ContentDisposition {
        disposition: if file.inline {
            DispositionType::Inline
        } else {
            DispositionType::Attachment
        },
        parameters: vec![DispositionParam::Filename(file.filename)],
    };

    HttpResponse::Ok()
        .content_type(file.mime)
        .insert_header(disposition)
        .body(file.bytes)
}

fn exported_response(
    result: Result<Option<ExportedFile>, ExportError>,
    target: ExportTarget,
) -> HttpResponse {
    match result {
        Ok(Some(file)) => file_response(file),
        Ok(None) => HttpResponse::NoContent().finish(),
        Err(e) => {
            log::error!("Export of {:?} failed: {}", target, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Gagal mengekspor dokumen."))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/preview/{target}",
    tag = "Export",
    params(
        ("target" = ExportTarget, Path, description = "lesson-plan, annual-program or semester-program")
    ),
    responses(
        (status = 200, description = "HTML preview", body = String, content_type = "text/html"),
        (status = 204, description = "Document not generated yet")
    )
)]
pub async fn preview(state: web::Data<AppState>, path: web::Path<TargetPath>) -> impl Responder {
    match current_document(&state, path.target) {
        Some(doc) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render_page(&doc.document)),
        None => HttpResponse::NoContent().finish(),
    }
}

#[utoipa::path(
    get,
    path = "/api/export/{target}/pdf",
    tag = "Export",
    params(
        ("target" = ExportTarget, Path, description = "lesson-plan, annual-program or semester-program"),
        PdfParams
    ),
    responses(
        (status = 200, description = "PDF document", body = Vec<u8>, content_type = "application/pdf"),
        (status = 204, description = "Document not generated yet"),
        (status = 500, description = "PDF compilation failed", body = ErrorResponse)
    )
)]
pub async fn export_pdf(
    state: web::Data<AppState>,
    path: web::Path<TargetPath>,
    query: web::Query<PdfParams>,
) -> impl Responder {
    let target = path.target;
    let doc = current_document(&state, target);
    let exporter = PdfExporter::new(state.config.pdf.clone(), query.mode);

    match web::block(move || export_document(&exporter, doc.as_ref())).await {
        Ok(result) => exported_response(result, target),
        Err(e) => {
            log::error!("PDF export task failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Gagal mengekspor dokumen."))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/export/{target}/word",
    tag = "Export",
    params(
        ("target" = ExportTarget, Path, description = "lesson-plan, annual-program or semester-program")
    ),
    responses(
        (status = 200, description = "Word-compatible .doc", body = String, content_type = "application/msword"),
        (status = 204, description = "Document not generated yet")
    )
)]
pub async fn export_word(
    state: web::Data<AppState>,
    path: web::Path<TargetPath>,
) -> impl Responder {
    let doc = current_document(&state, path.target);
    exported_response(export_document(&WordExporter, doc.as_ref()), path.target)
}

#[utoipa::path(
    get,
    path = "/api/export/{target}/print",
    tag = "Export",
    params(
        ("target" = ExportTarget, Path, description = "lesson-plan, annual-program or semester-program")
    ),
    responses(
        (status = 200, description = "Page that opens the print dialog", body = String, content_type = "text/html"),
        (status = 204, description = "Document not generated yet")
    )
)]
pub async fn export_print(
    state: web::Data<AppState>,
    path: web::Path<TargetPath>,
) -> impl Responder {
    let doc = current_document(&state, path.target);
    exported_response(export_document(&PrintExporter, doc.as_ref()), path.target)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/preview/{target}").route(web::get().to(preview)))
        .service(web::resource("/export/{target}/pdf").route(web::get().to(export_pdf)))
        .service(web::resource("/export/{target}/word").route(web::get().to(export_word)))
        .service(web::resource("/export/{target}/print").route(web::get().to(export_print)));
}
