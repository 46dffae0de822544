//! HTML serialisation of the document tree.
//!
//! The same markup is used for the on-screen preview, the Word `.doc`
//! wrapper and the print page; only the surrounding `<html>` differs.

use std::fmt::Write;

use super::common::escape_html;
use super::{Align, Block, Cell, CellKind, Document, Figure, Signatory, Table};

pub const STYLESHEET: &str = "\
body { font-family: 'Times New Roman', serif; font-size: 10pt; line-height: 1.5; }
h1.doc-title { text-align: center; font-size: 14pt; text-decoration: underline; text-transform: uppercase; margin-bottom: 4pt; }
p.doc-subtitle { text-align: center; font-weight: bold; margin: 2pt 0; }
table { border-collapse: collapse; width: 100%; border: 1pt solid black; margin-bottom: 10pt; }
td, th { border: 1pt solid black; padding: 6pt; vertical-align: top; text-align: left; white-space: pre-line; }
.text-center { text-align: center !important; }
.text-right { text-align: right !important; }
.bg-header { background-color: #fce4ec; font-weight: bold; text-align: center; text-transform: uppercase; border: 1pt solid black; padding: 6pt; margin: 12pt 0 8pt 0; }
.col-key { font-weight: bold; width: 30%; }
.col-head { background-color: #e5e7eb; font-weight: bold; }
.band { background-color: #f3f4f6; font-weight: bold; }
.marked { background-color: #d1fae5; color: #047857; }
.total { background-color: #eef2ff; font-weight: bold; }
.label { font-weight: bold; margin: 8pt 0 4pt 0; }
.framed { border: 1pt solid black; padding: 12pt; white-space: pre-line; }
.text { white-space: pre-line; }
table.plain, table.plain td { border: none; }
.figure img { max-width: 100%; }
.figure p { font-size: 8pt; font-style: italic; text-align: center; }
.signature td { border: none; text-align: center; }
.signature .name { font-weight: bold; text-decoration: underline; text-transform: uppercase; margin-top: 60pt; }
.page-break { page-break-before: always; }
";

/// Body markup for a document.
pub fn render_fragment(doc: &Document) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "<h1 class=\"doc-title\">{}</h1>", escape_html(&doc.title));
    for line in &doc.subtitle {
        let _ = writeln!(out, "<p class=\"doc-subtitle\">{}</p>", escape_html(line));
    }

    for section in &doc.sections {
        let class = if section.page_break_before {
            "section page-break"
        } else {
            "section"
        };
        let _ = writeln!(out, "<div class=\"{class}\">");
        if let Some(heading) = &section.heading {
            let _ = writeln!(out, "<div class=\"bg-header\">{}</div>", escape_html(heading));
        }
        for block in &section.blocks {
            write_block(&mut out, block);
        }
        out.push_str("</div>\n");
    }

    out
}

/// Standalone page with the embedded stylesheet.
pub fn render_page(doc: &Document) -> String {
    page(doc, "")
}

pub(crate) fn page(doc: &Document, extra_head: &str) -> String {
    let orientation = if doc.landscape { "landscape" } else { "portrait" };
    format!(
        "<!DOCTYPE html>\n<html lang=\"id\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{STYLESHEET}@page {{ size: {orientation}; }}\n</style>\n{extra_head}</head>\n<body>\n{body}</body>\n</html>\n",
        title = escape_html(&doc.title),
        body = render_fragment(doc),
    )
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Table(table) => write_table(out, table),
        Block::Label(text) => {
            let _ = writeln!(out, "<p class=\"label\">{}</p>", escape_html(text));
        }
        Block::Text { text, framed } => {
            let class = if *framed { "framed" } else { "text" };
            let _ = writeln!(out, "<div class=\"{class}\">{}</div>", escape_html(text));
        }
        Block::Grid { columns, items } => write_grid(out, *columns, items),
        Block::TextWithFigure { text, figure } => {
            out.push_str("<table class=\"plain\"><tr>");
            let _ = write!(
                out,
                "<td style=\"width: 65%\"><div class=\"text\"><i>{}</i></div></td>",
                escape_html(text)
            );
            out.push_str("<td>");
            if let Some(figure) = figure {
                write_figure(out, figure);
            }
            out.push_str("</td></tr></table>\n");
        }
        Block::Signatures(signers) => write_signatures(out, signers),
    }
}

fn cell_class(cell: &Cell) -> Vec<&'static str> {
    let mut classes = Vec::new();
    match cell.kind {
        CellKind::Plain => {}
        CellKind::Key => classes.push("col-key"),
        CellKind::Header => classes.push("col-head"),
        CellKind::Band => classes.push("band"),
        CellKind::Marked => classes.push("marked"),
        CellKind::Total => classes.push("total"),
    }
    match cell.align {
        Align::Left => {}
        Align::Center => classes.push("text-center"),
        Align::Right => classes.push("text-right"),
    }
    classes
}

fn write_table(out: &mut String, table: &Table) {
    out.push_str("<table>\n");

    let total: u32 = table.widths.iter().map(|w| *w as u32).sum();
    if total > 0 {
        out.push_str("<colgroup>");
        for width in &table.widths {
            let _ = write!(out, "<col style=\"width: {:.2}%\">", *width as f64 * 100.0 / total as f64);
        }
        out.push_str("</colgroup>\n");
    }

    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            let tag = if cell.kind == CellKind::Header { "th" } else { "td" };
            let _ = write!(out, "<{tag}");
            let classes = cell_class(cell);
            if !classes.is_empty() {
                let _ = write!(out, " class=\"{}\"", classes.join(" "));
            }
            if cell.colspan > 1 {
                let _ = write!(out, " colspan=\"{}\"", cell.colspan);
            }
            if cell.rowspan > 1 {
                let _ = write!(out, " rowspan=\"{}\"", cell.rowspan);
            }
            let _ = write!(out, ">{}</{tag}>", escape_html(&cell.text));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</table>\n");
}

fn write_grid(out: &mut String, columns: usize, items: &[String]) {
    let columns = columns.max(1);
    out.push_str("<table class=\"plain\">\n");
    for chunk in items.chunks(columns) {
        out.push_str("<tr>");
        for item in chunk {
            let _ = write!(out, "<td>{}</td>", escape_html(item));
        }
        for _ in chunk.len()..columns {
            out.push_str("<td></td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
}

fn write_figure(out: &mut String, figure: &Figure) {
    let _ = write!(
        out,
        "<div class=\"figure\"><img src=\"{}\" alt=\"Media\"><p>{}</p></div>",
        escape_html(&figure.src),
        escape_html(&figure.caption)
    );
}

fn write_signatures(out: &mut String, signers: &[Signatory]) {
    out.push_str("<table class=\"plain signature\"><tr>");
    for signer in signers {
        out.push_str("<td>");
        for line in &signer.lines {
            let _ = write!(out, "<p>{}</p>", escape_html(line));
        }
        let _ = write!(
            out,
            "<p class=\"name\">{}</p><p>NIP. {}</p>",
            escape_html(&signer.name),
            escape_html(&signer.nip)
        );
        out.push_str("</td>");
    }
    out.push_str("</tr></table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Section;

    fn doc(blocks: Vec<Block>) -> Document {
        Document {
            title: "PROGRAM TAHUNAN (PROTA)".to_string(),
            subtitle: vec!["KURIKULUM MERDEKA".to_string()],
            landscape: false,
            sections: vec![Section {
                heading: Some("I. <IDENTITAS>".to_string()),
                page_break_before: true,
                blocks,
            }],
        }
    }

    #[test]
    fn test_table_spans_and_classes() {
        let table = Table::new(vec![1, 3])
            .row(vec![Cell::band("KEGIATAN", 2)])
            .row(vec![Cell::key("Kunci"), Cell::new("a & b")]);
        let html = render_fragment(&doc(vec![Block::Table(table)]));
        assert!(html.contains("<td class=\"band text-center\" colspan=\"2\">KEGIATAN</td>"));
        assert!(html.contains("<td class=\"col-key\">Kunci</td><td>a &amp; b</td>"));
        assert!(html.contains("<col style=\"width: 25.00%\">"));
        assert!(html.contains("section page-break"));
        assert!(html.contains("I. &lt;IDENTITAS&gt;"));
    }

    #[test]
    fn test_grid_pads_last_row() {
        let html = render_fragment(&doc(vec![Block::Grid {
            columns: 2,
            items: vec!["A. 1".to_string(), "B. 2".to_string(), "C. 3".to_string()],
        }]));
        assert!(html.contains("<tr><td>C. 3</td><td></td></tr>"));
    }

    #[test]
    fn test_page_is_standalone() {
        let html = render_page(&doc(vec![]));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("border-collapse: collapse"));
        assert!(html.contains("size: portrait"));
    }
}
