//! Typst serialisation of the document tree, compiled to PDF by the export
//! adapter. Inline `data:` images are emitted as asset files next to the
//! source; remote images are left out.

use std::fmt::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::common::escape_typst_string;
use super::{Align, Block, Cell, CellKind, Document, Figure, Signatory, Table};
use crate::export::pdf::PageFormat;

const HEADER_FILL: &str = "rgb(\"#fce4ec\")";
const COLUMN_FILL: &str = "rgb(\"#e5e7eb\")";
const BAND_FILL: &str = "rgb(\"#f3f4f6\")";
const MARKED_FILL: &str = "rgb(\"#d1fae5\")";
const TOTAL_FILL: &str = "rgb(\"#eef2ff\")";

#[derive(Debug, Clone, PartialEq)]
pub struct TypstAsset {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypstSource {
    pub source: String,
    pub assets: Vec<TypstAsset>,
}

/// Text as Typst content; line breaks are kept.
fn content(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| format!("#\"{}\"", escape_typst_string(line)))
        .collect();
    format!("[{}]", lines.join(" #linebreak() "))
}

fn strong(text: &str) -> String {
    format!("[#strong{}]", content(text))
}

pub fn to_typst(doc: &Document, page: PageFormat, margin_mm: u32) -> TypstSource {
    let mut writer = TypstWriter::default();
    let (mut width, mut height) = page.dimensions_mm();
    if doc.landscape {
        std::mem::swap(&mut width, &mut height);
    }

    let out = &mut writer.source;
    let _ = writeln!(
        out,
        "#set page(width: {width}mm, height: {height}mm, margin: {margin_mm}mm)"
    );
    out.push_str("#set text(font: \"Times New Roman\", size: 10pt, lang: \"id\")\n");
    out.push_str("#set table(stroke: 1pt + black, inset: 6pt)\n\n");

    let _ = writeln!(
        out,
        "#align(center)[#text(size: 14pt, weight: \"bold\")[#underline{}]]",
        content(&doc.title)
    );
    for line in &doc.subtitle {
        let _ = writeln!(out, "#align(center)[#strong{}]", content(line));
    }
    out.push('\n');

    for section in &doc.sections {
        if section.page_break_before {
            writer.source.push_str("#pagebreak(weak: true)\n");
        }
        if let Some(heading) = &section.heading {
            let _ = writeln!(
                writer.source,
                "#block(width: 100%, fill: {HEADER_FILL}, stroke: 1pt + black, inset: 6pt)[#align(center){}]\n",
                strong(heading)
            );
        }
        for block in &section.blocks {
            writer.block(block);
            writer.source.push('\n');
        }
    }

    TypstSource {
        source: writer.source,
        assets: writer.assets,
    }
}

#[derive(Default)]
struct TypstWriter {
    source: String,
    assets: Vec<TypstAsset>,
}

impl TypstWriter {
    fn block(&mut self, block: &Block) {
        match block {
            Block::Table(table) => self.table(table),
            Block::Label(text) => {
                let _ = writeln!(self.source, "#block(above: 8pt, below: 4pt){}", strong(text));
            }
            Block::Text { text, framed } => {
                if *framed {
                    let _ = writeln!(
                        self.source,
                        "#block(width: 100%, stroke: 1pt + black, inset: 12pt){}",
                        content(text)
                    );
                } else {
                    let _ = writeln!(self.source, "#block(width: 100%){}", content(text));
                }
            }
            Block::Grid { columns, items } => {
                let cells: Vec<String> = items.iter().map(|i| content(i)).collect();
                let _ = writeln!(
                    self.source,
                    "#grid(columns: (1fr,) * {}, gutter: 6pt, {})",
                    (*columns).max(1),
                    cells.join(", ")
                );
            }
            Block::TextWithFigure { text, figure } => {
                let figure = figure
                    .as_ref()
                    .map(|f| self.figure(f))
                    .unwrap_or_else(|| "[]".to_string());
                let _ = writeln!(
                    self.source,
                    "#grid(columns: (65%, 1fr), gutter: 12pt, [#emph{}], {})",
                    content(text),
                    figure
                );
            }
            Block::Signatures(signers) => self.signatures(signers),
        }
    }

    fn table(&mut self, table: &Table) {
        let columns: Vec<String> = table.widths.iter().map(|w| format!("{w}fr")).collect();
        let _ = writeln!(self.source, "#table(\n  columns: ({},),", columns.join(", "));
        for row in &table.rows {
            for cell in row {
                let _ = writeln!(self.source, "  {},", table_cell(cell));
            }
        }
        self.source.push_str(")\n");
    }

    /// Content for a figure; inline images become assets.
    fn figure(&mut self, figure: &Figure) -> String {
        let caption = format!(
            "#align(center)[#text(size: 8pt)[#emph{}]]",
            content(&figure.caption)
        );
        match decode_data_url(&figure.src) {
            Some((extension, bytes)) => {
                let filename = format!("asset-{}.{}", self.assets.len(), extension);
                let image = format!("#image(\"{filename}\", width: 100%)");
                self.assets.push(TypstAsset { filename, bytes });
                format!("[{image} {caption}]")
            }
            None => {
                log::debug!("remote illustration left out of the PDF");
                "[]".to_string()
            }
        }
    }

    fn signatures(&mut self, signers: &[Signatory]) {
        let columns = vec!["1fr"; signers.len().max(1)].join(", ");
        let cells: Vec<String> = signers
            .iter()
            .map(|s| {
                let lines: Vec<String> = s.lines.iter().map(|l| content(l)).collect();
                format!(
                    "[{} #v(60pt) #strong[#underline[#upper{}]] #linebreak() {}]",
                    lines.join(" #linebreak() "),
                    content(&s.name),
                    content(&format!("NIP. {}", s.nip))
                )
            })
            .collect();
        let _ = writeln!(
            self.source,
            "#v(24pt)\n#grid(columns: ({columns},), align: center, {})",
            cells.join(", ")
        );
    }
}

fn table_cell(cell: &Cell) -> String {
    let mut args: Vec<String> = Vec::new();
    if cell.colspan > 1 {
        args.push(format!("colspan: {}", cell.colspan));
    }
    if cell.rowspan > 1 {
        args.push(format!("rowspan: {}", cell.rowspan));
    }
    let fill = match cell.kind {
        CellKind::Header => Some(COLUMN_FILL),
        CellKind::Band => Some(BAND_FILL),
        CellKind::Marked => Some(MARKED_FILL),
        CellKind::Total => Some(TOTAL_FILL),
        CellKind::Plain | CellKind::Key => None,
    };
    if let Some(fill) = fill {
        args.push(format!("fill: {fill}"));
    }
    match cell.align {
        Align::Left => {}
        Align::Center => args.push("align: center".to_string()),
        Align::Right => args.push("align: right".to_string()),
    }

    let body = match cell.kind {
        CellKind::Plain | CellKind::Marked => content(&cell.text),
        _ => strong(&cell.text),
    };

    if args.is_empty() {
        body
    } else {
        format!("table.cell({}){}", args.join(", "), body)
    }
}

/// Split a base64 `data:` URL into a file extension and the decoded bytes.
fn decode_data_url(src: &str) -> Option<(&'static str, Vec<u8>)> {
    let rest = src.strip_prefix("data:")?;
    let (meta, data) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let extension = match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        _ => return None,
    };
    STANDARD.decode(data.trim()).ok().map(|bytes| (extension, bytes))
}
