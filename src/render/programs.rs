use super::{signature_block, Align, Block, Cell, CellKind, Document, RenderContext, Section, Table};
use crate::form::LessonPlanForm;
use crate::program::{scheduled_weeks, semester_months, SemesterPlan, WEEKS_PER_MONTH};
use crate::suggestion::types::ProtaEntry;

pub const ANNUAL_TITLE: &str = "PROGRAM TAHUNAN (PROTA)";
pub const SEMESTER_TITLE: &str = "PROGRAM SEMESTER (PROMES)";

fn signatures(form: &LessonPlanForm, ctx: &RenderContext) -> Section {
    Section::untitled().block(signature_block(
        &form.principal_name,
        &form.principal_nip,
        &form.teacher_name,
        &form.teacher_nip,
        ctx,
    ))
}

pub fn render_annual_program(
    form: &LessonPlanForm,
    entries: &[ProtaEntry],
    ctx: &RenderContext,
) -> Document {
    let mut table = Table::new(vec![8, 15, 60, 17]).row(vec![
        Cell::header("No"),
        Cell::header("Semester"),
        Cell::header("Materi / Lingkup Materi"),
        Cell::header("Alokasi JP"),
    ]);

    for (idx, entry) in entries.iter().enumerate() {
        table.push(vec![
            Cell::new((idx + 1).to_string()).centered(),
            Cell::new(entry.semester.to_string()).centered(),
            Cell::new(entry.material.clone()),
            Cell::new(format!("{} JP", entry.hours)).centered(),
        ]);
    }

    let total: u32 = entries.iter().map(|e| e.hours).sum();
    table.push(vec![
        Cell::new("Total Alokasi Waktu per Tahun")
            .kind(CellKind::Total)
            .align(Align::Right)
            .span(3, 1),
        Cell::new(format!("{total} JP"))
            .kind(CellKind::Total)
            .centered(),
    ]);

    Document {
        title: ANNUAL_TITLE.to_string(),
        subtitle: vec![
            format!("KURIKULUM MERDEKA TAHUN PELAJARAN {}", form.academic_year),
            format!(
                "Mata Pelajaran: {}    Satuan Pendidikan: {}    Kelas: {}",
                form.subject, form.school_name, form.grade
            ),
        ],
        landscape: false,
        sections: vec![
            Section::untitled().block(Block::Table(table)),
            signatures(form, ctx),
        ],
    }
}

pub fn render_semester_program(
    form: &LessonPlanForm,
    plan: &SemesterPlan,
    ctx: &RenderContext,
) -> Document {
    let months = semester_months(plan.semester);
    let weeks = WEEKS_PER_MONTH as usize;

    let mut widths = vec![3, 30, 5];
    widths.extend(std::iter::repeat(2).take(months.len() * weeks));

    let mut month_row = vec![
        Cell::header("No").span(1, 2),
        Cell::header("Tujuan Pembelajaran / Lingkup Materi").span(1, 2),
        Cell::header("JP").span(1, 2),
    ];
    month_row.extend(
        months
            .iter()
            .map(|m| Cell::header(m.name.to_uppercase()).span(WEEKS_PER_MONTH as u16, 1)),
    );

    let week_row: Vec<Cell> = months
        .iter()
        .flat_map(|_| (1..=WEEKS_PER_MONTH).map(|w| Cell::header(w.to_string())))
        .collect();

    let mut table = Table::new(widths).row(month_row).row(week_row);

    for (idx, entry) in plan.entries.iter().enumerate() {
        let mut marked = vec![false; months.len() * weeks];
        for code in scheduled_weeks(entry, plan.semester) {
            marked[code.month * weeks + (code.week as usize - 1)] = true;
        }

        let mut row = vec![
            Cell::new((idx + 1).to_string()).centered(),
            Cell::new(entry.material.clone()),
            Cell::new(entry.hours.to_string()).centered(),
        ];
        row.extend(marked.into_iter().map(|on| {
            if on {
                Cell::new("●").kind(CellKind::Marked).centered()
            } else {
                Cell::new("")
            }
        }));
        table.push(row);
    }

    let parity = if plan.semester == 1 { "Ganjil" } else { "Genap" };

    Document {
        title: SEMESTER_TITLE.to_string(),
        subtitle: vec![
            format!(
                "SEMESTER {} ({}) TAHUN PELAJARAN {}",
                plan.semester,
                parity.to_uppercase(),
                form.academic_year
            ),
            format!("Mata Pelajaran: {}    Kelas: {}", form.subject, form.grade),
        ],
        landscape: true,
        sections: vec![
            Section::untitled().block(Block::Table(table)),
            signatures(form, ctx),
        ],
    }
}
