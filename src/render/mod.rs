//! Print-oriented document tree and the mappings that build it.
//!
//! - `lesson_plan` - lesson plan (RPM) document
//! - `programs` - annual (Prota) and semester (Promes) program documents
//! - `html` - HTML serialisation for preview, Word and print
//! - `typst` - Typst serialisation for PDF compilation
//! - `common` - dates, escaping and file names

pub mod common;
pub mod html;
pub mod lesson_plan;
pub mod programs;
pub mod typst;

pub use lesson_plan::render_lesson_plan;
pub use programs::{render_annual_program, render_semester_program};

use chrono::NaiveDate;

/// Signing place and date printed in the signature block.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub signing_place: String,
    pub date: NaiveDate,
}

impl RenderContext {
    pub fn today(signing_place: impl Into<String>) -> Self {
        Self {
            signing_place: signing_place.into(),
            date: chrono::Local::now().date_naive(),
        }
    }

    pub fn signing_line(&self) -> String {
        format!(
            "{}, {}",
            self.signing_place,
            common::format_indonesian_date(self.date)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    /// Lines printed under the title
    pub subtitle: Vec<String>,
    pub landscape: bool,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Shaded banner above the section
    pub heading: Option<String>,
    pub page_break_before: bool,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: Some(heading.into()),
            page_break_before: false,
            blocks: Vec::new(),
        }
    }

    pub fn untitled() -> Self {
        Self {
            heading: None,
            page_break_before: false,
            blocks: Vec::new(),
        }
    }

    pub fn on_new_page(mut self) -> Self {
        self.page_break_before = true;
        self
    }

    pub fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Table(Table),
    /// Bold line, e.g. a meeting badge or a question prompt
    Label(String),
    /// Multi-line text; `framed` draws a border around it
    Text { text: String, framed: bool },
    /// Short items laid out in equal columns
    Grid { columns: usize, items: Vec<String> },
    /// Text with an optional figure to its right
    TextWithFigure { text: String, figure: Option<Figure> },
    Signatures(Vec<Signatory>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// `data:` URL or remote URL
    pub src: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signatory {
    /// Lines above the signing space
    pub lines: Vec<String>,
    pub name: String,
    pub nip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Plain,
    /// Left-hand label column of a key/value table
    Key,
    /// Column header
    Header,
    /// Full-width phase heading inside a table
    Band,
    /// Scheduled slot in a week grid
    Marked,
    Total,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub colspan: u16,
    pub rowspan: u16,
    pub kind: CellKind,
    pub align: Align,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            colspan: 1,
            rowspan: 1,
            kind: CellKind::Plain,
            align: Align::Left,
        }
    }

    pub fn key(text: impl Into<String>) -> Self {
        Self::new(text).kind(CellKind::Key)
    }

    pub fn header(text: impl Into<String>) -> Self {
        Self::new(text).kind(CellKind::Header).align(Align::Center)
    }

    pub fn band(text: impl Into<String>, colspan: u16) -> Self {
        Self::new(text)
            .kind(CellKind::Band)
            .align(Align::Center)
            .span(colspan, 1)
    }

    pub fn kind(mut self, kind: CellKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn span(mut self, colspan: u16, rowspan: u16) -> Self {
        self.colspan = colspan.max(1);
        self.rowspan = rowspan.max(1);
        self
    }

    pub fn centered(self) -> Self {
        self.align(Align::Center)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Relative column widths
    pub widths: Vec<u16>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(widths: Vec<u16>) -> Self {
        Self {
            widths,
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, cells: Vec<Cell>) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn push(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    /// Two-column label/value table.
    pub fn key_value<K: Into<String>, V: Into<String>>(rows: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut table = Self::new(vec![30, 70]);
        for (key, value) in rows {
            table.push(vec![Cell::key(key), Cell::new(value)]);
        }
        table
    }
}

/// Two signature columns: principal on the left, teacher on the right.
pub fn signature_block(
    principal_name: &str,
    principal_nip: &str,
    teacher_name: &str,
    teacher_nip: &str,
    ctx: &RenderContext,
) -> Block {
    Block::Signatures(vec![
        Signatory {
            lines: vec!["Mengetahui,".to_string(), "Kepala Sekolah".to_string()],
            name: principal_name.to_string(),
            nip: principal_nip.to_string(),
        },
        Signatory {
            lines: vec![ctx.signing_line(), "Guru Kelas".to_string()],
            name: teacher_name.to_string(),
            nip: teacher_nip.to_string(),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_line_uses_long_indonesian_date() {
        let ctx = RenderContext {
            signing_place: "Andopan".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        };
        assert_eq!(ctx.signing_line(), "Andopan, 19 Oktober 2026");
    }

    #[test]
    fn test_span_never_below_one() {
        let cell = Cell::new("x").span(0, 0);
        assert_eq!((cell.colspan, cell.rowspan), (1, 1));
    }
}
