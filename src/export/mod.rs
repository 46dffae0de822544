//! Export adapters: PDF (Typst), Word (`.doc` HTML) and print page.
//!
//! Every adapter takes the same rendered document. When the requested
//! document does not exist yet the adapters do nothing and return `Ok(None)`.

pub mod pdf;
pub mod print;
pub mod routes;
pub mod word;

pub use pdf::{PageFormat, PdfExporter, PdfMode};
pub use print::PrintExporter;
pub use word::WordExporter;

use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::form::FormState;
use crate::program::ProgramState;
use crate::render::common::export_filename;
use crate::render::{
    render_annual_program, render_lesson_plan, render_semester_program, Document, RenderContext,
};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write Typst source: {0}")]
    WriteTypst(#[source] std::io::Error),
    #[error("failed to write image asset: {0}")]
    WriteAsset(#[source] std::io::Error),
    #[error("Typst CLI execution failed: {0}")]
    TypstIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {code}: {stderr}")]
    TypstExit { code: i32, stderr: String },
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
}

/// Documents that can be previewed and exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ExportTarget {
    LessonPlan,
    AnnualProgram,
    SemesterProgram,
}

/// A rendered document and the base name its files are saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub document: Document,
    pub basename: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    /// Shown in the browser rather than downloaded
    pub inline: bool,
}

pub trait Exporter {
    fn export(&self, doc: &RenderedDocument) -> Result<ExportedFile, ExportError>;
}

/// Run `exporter` if there is a document; nothing to export is not an error.
pub fn export_document<E: Exporter + ?Sized>(
    exporter: &E,
    doc: Option<&RenderedDocument>,
) -> Result<Option<ExportedFile>, ExportError> {
    match doc {
        Some(doc) => exporter.export(doc).map(Some),
        None => {
            log::debug!("nothing to export");
            Ok(None)
        }
    }
}

/// Render `target` from the current session, if it has been generated.
pub fn build_document(
    target: ExportTarget,
    form: &FormState,
    programs: &ProgramState,
    ctx: &RenderContext,
) -> Option<RenderedDocument> {
    let data = &form.form_data;
    match target {
        ExportTarget::LessonPlan => {
            let content = form.generated_content.as_ref()?;
            Some(RenderedDocument {
                document: render_lesson_plan(
                    data,
                    content,
                    form.generated_image_url.as_deref(),
                    ctx,
                ),
                basename: export_filename("RPM_2025_", &data.material, "dokumen"),
            })
        }
        ExportTarget::AnnualProgram => {
            let entries = programs.prota.as_ref()?;
            Some(RenderedDocument {
                document: render_annual_program(data, entries, ctx),
                basename: export_filename("PROTA_", &data.subject, "dokumen"),
            })
        }
        ExportTarget::SemesterProgram => {
            let plan = programs.promes.as_ref()?;
            Some(RenderedDocument {
                document: render_semester_program(data, plan, ctx),
                basename: export_filename("PROMES_", &data.subject, "dokumen"),
            })
        }
    }
}
