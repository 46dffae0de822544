//! PDF export: Typst source compiled by the `typst` CLI in a temporary
//! directory.

use std::fs;
use std::process::Command;

use serde::Deserialize;
use tempfile::{tempdir, TempDir};
use utoipa::ToSchema;

use super::{ExportError, ExportedFile, Exporter, RenderedDocument};
use crate::config::PdfConfig;
use crate::render::typst::to_typst;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    A4,
    /// Folio, 215 x 330 mm
    F4,
    Letter,
}

impl PageFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "f4" | "folio" => Some(Self::F4),
            "letter" | "us-letter" => Some(Self::Letter),
            _ => None,
        }
    }

    /// Portrait width and height in millimetres.
    pub fn dimensions_mm(self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::F4 => (215, 330),
            Self::Letter => (216, 279),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PdfMode {
    /// Served as an attachment
    #[default]
    Download,
    /// Served inline for a new browser tab
    Preview,
}

pub struct PdfExporter {
    pub config: PdfConfig,
    pub mode: PdfMode,
}

impl PdfExporter {
    pub fn new(config: PdfConfig, mode: PdfMode) -> Self {
        Self { config, mode }
    }
}

impl Exporter for PdfExporter {
    fn export(&self, doc: &RenderedDocument) -> Result<ExportedFile, ExportError> {
        let typst = to_typst(&doc.document, self.config.page, self.config.margin_mm);

        let temp_dir = tempdir().map_err(ExportError::TempDir)?;
        let typ_filename = "document.typ";
        fs::write(temp_dir.path().join(typ_filename), &typst.source)
            .map_err(ExportError::WriteTypst)?;
        for asset in &typst.assets {
            fs::write(temp_dir.path().join(&asset.filename), &asset.bytes)
                .map_err(ExportError::WriteAsset)?;
        }

        let bytes = compile_typst_to_pdf(&self.config.typst_bin, &temp_dir, typ_filename, "document.pdf")?;
        log::info!("Compiled {}.pdf ({} bytes)", doc.basename, bytes.len());

        Ok(ExportedFile {
            filename: format!("{}.pdf", doc.basename),
            mime: "application/pdf",
            bytes,
            inline: self.mode == PdfMode::Preview,
        })
    }
}

fn compile_typst_to_pdf(
    typst_bin: &str,
    temp_dir: &TempDir,
    typ_filename: &str,
    output_filename: &str,
) -> Result<Vec<u8>, ExportError> {
    let typ_path = temp_dir.path().join(typ_filename);
    let output_path = temp_dir.path().join(output_filename);

    let output = Command::new(typst_bin)
        .arg("compile")
        .arg(&typ_path)
        .arg(&output_path)
        .current_dir(temp_dir.path())
        .output()
        .map_err(ExportError::TypstIo)?;

    if !output.status.success() {
        return Err(ExportError::TypstExit {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    fs::read(&output_path).map_err(ExportError::ReadPdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Document;

    #[test]
    fn test_page_format_parse() {
        assert_eq!(PageFormat::parse("A4"), Some(PageFormat::A4));
        assert_eq!(PageFormat::parse(" folio "), Some(PageFormat::F4));
        assert_eq!(PageFormat::parse("letter"), Some(PageFormat::Letter));
        assert_eq!(PageFormat::parse("a5"), None);
    }

    #[test]
    fn test_missing_compiler_is_reported() {
        let exporter = PdfExporter::new(
            PdfConfig {
                typst_bin: "/nonexistent/typst-binary".to_string(),
                ..PdfConfig::default()
            },
            PdfMode::Download,
        );
        let doc = RenderedDocument {
            document: Document {
                title: "RPM".to_string(),
                subtitle: Vec::new(),
                landscape: false,
                sections: Vec::new(),
            },
            basename: "RPM_2025_Pecahan".to_string(),
        };
        assert!(matches!(exporter.export(&doc), Err(ExportError::TypstIo(_))));
    }
}
