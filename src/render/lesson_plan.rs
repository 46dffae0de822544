use super::{signature_block, Block, Cell, Document, Figure, RenderContext, Section, Table};
use crate::form::model::TagLabel;
use crate::form::LessonPlanForm;
use crate::suggestion::types::{AssessmentItem, CorePhase, GeneratedContent, Meeting};

pub const TITLE: &str = "RENCANA PEMBELAJARAN MENDALAM (RPM)";
pub const FIGURE_CAPTION: &str = "Ilustrasi Pendukung Materi";

/// Map the form and its generated content onto the lesson plan document.
pub fn render_lesson_plan(
    form: &LessonPlanForm,
    content: &GeneratedContent,
    image_url: Option<&str>,
    ctx: &RenderContext,
) -> Document {
    let mut sections = vec![identity(form), design(form, content), learning_experience(content)];

    sections.push(Section::new("IV. ASESMEN PEMBELAJARAN").on_new_page().block(
        Block::Table(assessment_matrix(content)),
    ));

    sections.push(Section::new("RINGKASAN MATERI DAN MEDIA VISUAL").block(Block::TextWithFigure {
        text: content.summary.clone(),
        figure: image_url.filter(|url| !url.is_empty()).map(|src| Figure {
            src: src.to_string(),
            caption: FIGURE_CAPTION.to_string(),
        }),
    }));

    sections.push(
        Section::new("V. LEMBAR KERJA PESERTA DIDIK (LKPD)")
            .on_new_page()
            .block(Block::Text {
                text: content.lkpd.clone(),
                framed: true,
            }),
    );

    sections.push(quiz(content));

    sections.push(Section::untitled().block(signature_block(
        &form.principal_name,
        &form.principal_nip,
        &form.teacher_name,
        &form.teacher_nip,
        ctx,
    )));

    Document {
        title: TITLE.to_string(),
        subtitle: Vec::new(),
        landscape: false,
        sections,
    }
}

fn labels<T: TagLabel>(tags: &[T]) -> String {
    tags.iter().map(|t| t.label()).collect::<Vec<_>>().join(", ")
}

fn identity(form: &LessonPlanForm) -> Section {
    Section::new("I. IDENTITAS PEMBELAJARAN").block(Block::Table(Table::key_value([
        ("Satuan Pendidikan", form.school_name.clone()),
        ("Mata Pelajaran", form.subject.clone()),
        ("Kelas / Semester", format!("{} / Semester 2 (Genap)", form.grade)),
        ("Tahun Pelajaran", form.academic_year.clone()),
        ("Topik Materi", form.material.clone()),
        (
            "Alokasi Waktu",
            format!("{} ({} Pertemuan)", form.duration, form.meeting_count),
        ),
    ])))
}

fn design(form: &LessonPlanForm, content: &GeneratedContent) -> Section {
    Section::new("II. DESAIN PEMBELAJARAN").block(Block::Table(Table::key_value([
        ("Capaian Pembelajaran", form.cp.clone()),
        ("Tujuan Pembelajaran", form.tp.clone()),
        ("Praktik Pedagogis", labels(&form.pedagogy)),
        ("Profil Pelajar Pancasila", labels(&form.dimensions)),
        ("Kebutuhan Siswa", content.students.clone()),
        ("Lintas Disiplin Ilmu", content.interdisciplinary.clone()),
        ("Kemitraan Pembelajaran", content.partnership.clone()),
        ("Lingkungan Pembelajaran", content.environment.clone()),
        ("Pemanfaatan Digital", content.digital_tools.clone()),
    ])))
}

fn learning_experience(content: &GeneratedContent) -> Section {
    let mut section = Section::new("III. PENGALAMAN BELAJAR (PEMBELAJARAN MENDALAM)");
    for (idx, meeting) in content.meetings.iter().enumerate() {
        section.blocks.push(Block::Label(format!("SESI PERTEMUAN KE-{}", idx + 1)));
        section.blocks.push(Block::Table(meeting_table(meeting)));
    }
    section
}

fn core_phase_row(label: &str, phase: &CorePhase) -> Vec<Cell> {
    vec![
        Cell::key(format!(
            "{}\n({})\nWaktu: {}",
            label, phase.approach, phase.duration
        )),
        Cell::new(phase.steps.clone()),
    ]
}

fn meeting_table(meeting: &Meeting) -> Table {
    Table::new(vec![30, 70])
        .row(vec![Cell::band(
            format!("1. KEGIATAN PENDAHULUAN ({})", meeting.opening.duration),
            2,
        )])
        .row(vec![Cell::new(meeting.opening.steps.clone()).span(2, 1)])
        .row(vec![Cell::band("2. KEGIATAN INTI (CORE DEEP LEARNING)", 2)])
        .row(core_phase_row("A. Understand (Memahami)", &meeting.understand))
        .row(core_phase_row("B. Apply (Aplikasi)", &meeting.apply))
        .row(core_phase_row("C. Reflect (Refleksi)", &meeting.reflect))
        .row(vec![Cell::band(
            format!("3. KEGIATAN PENUTUP ({})", meeting.closing.duration),
            2,
        )])
        .row(vec![Cell::new(meeting.closing.steps.clone()).span(2, 1)])
}

fn assessment_row(component: &str, item: &AssessmentItem) -> Vec<Cell> {
    vec![
        Cell::key(component),
        Cell::new(item.technique.clone()),
        Cell::new(item.instrument.clone()),
        Cell::new(item.rubric.clone()),
    ]
}

fn assessment_matrix(content: &GeneratedContent) -> Table {
    let assessments = &content.assessments;
    Table::new(vec![20, 25, 25, 30])
        .row(vec![
            Cell::header("Komponen"),
            Cell::header("Teknik"),
            Cell::header("Instrumen"),
            Cell::header("Kriteria Rubrik"),
        ])
        .row(assessment_row("Awal", &assessments.initial))
        .row(assessment_row("Proses", &assessments.process))
        .row(assessment_row("Akhir", &assessments.summative))
}

fn quiz(content: &GeneratedContent) -> Section {
    let mut section = Section::new("VI. SOAL FORMATIF (HOTS)");

    for (idx, question) in content.formative_questions.iter().enumerate() {
        let options = &question.options;
        section
            .blocks
            .push(Block::Label(format!("{}. {}", idx + 1, question.question)));
        section.blocks.push(Block::Grid {
            columns: 2,
            items: vec![
                format!("A. {}", options.a),
                format!("B. {}", options.b),
                format!("C. {}", options.c),
                format!("D. {}", options.d),
            ],
        });
    }

    if !content.formative_questions.is_empty() {
        section
            .blocks
            .push(Block::Label("KUNCI JAWABAN SOAL FORMATIF:".to_string()));
        section.blocks.push(Block::Grid {
            columns: 5,
            items: content
                .formative_questions
                .iter()
                .enumerate()
                .map(|(idx, q)| format!("{}. {}", idx + 1, q.answer.letter()))
                .collect(),
        });
    }

    section
}
