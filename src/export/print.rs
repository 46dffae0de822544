use super::{ExportError, ExportedFile, Exporter, RenderedDocument};
use crate::render::html::page;

const PRINT_SCRIPT: &str = "<script>window.onload = () => window.print();</script>\n";

/// Standalone page that opens the browser print dialog once loaded.
pub struct PrintExporter;

impl Exporter for PrintExporter {
    fn export(&self, doc: &RenderedDocument) -> Result<ExportedFile, ExportError> {
        Ok(ExportedFile {
            filename: format!("{}.html", doc.basename),
            mime: "text/html; charset=utf-8",
            bytes: page(&doc.document, PRINT_SCRIPT).into_bytes(),
            inline: true,
        })
    }
}
