use super::{ExportError, ExportedFile, Exporter, RenderedDocument};
use crate::render::common::escape_html;
use crate::render::html::{render_fragment, STYLESHEET};

const BOM: &str = "\u{feff}";

/// Word-compatible `.doc`: Office-namespaced HTML with a UTF-8 BOM.
pub struct WordExporter;

pub fn word_document(doc: &RenderedDocument) -> String {
    format!(
        "{BOM}<html xmlns:o='urn:schemas-microsoft-com:office:office' xmlns:w='urn:schemas-microsoft-com:office:word' xmlns='http://www.w3.org/TR/REC-html40'>\n<head><meta charset='utf-8'><title>{title}</title><style>\n{STYLESHEET}</style></head>\n<body>\n{body}</body></html>\n",
        title = escape_html(&doc.document.title),
        body = render_fragment(&doc.document),
    )
}

impl Exporter for WordExporter {
    fn export(&self, doc: &RenderedDocument) -> Result<ExportedFile, ExportError> {
        Ok(ExportedFile {
            filename: format!("{}.doc", doc.basename),
            mime: "application/msword",
            bytes: word_document(doc).into_bytes(),
            inline: false,
        })
    }
}
