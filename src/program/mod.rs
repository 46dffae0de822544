//! Annual (Prota) and semester (Promes) program tables for the current view.

pub mod routes;

use parking_lot::RwLock;
use serde::Serialize;
use utoipa::ToSchema;

use crate::suggestion::types::{PromesEntry, ProtaEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SemesterMonth {
    pub name: &'static str,
    /// Abbreviation used in week codes
    pub code: &'static str,
}

const fn month(name: &'static str, code: &'static str) -> SemesterMonth {
    SemesterMonth { name, code }
}

pub const ODD_SEMESTER: [SemesterMonth; 6] = [
    month("Juli", "Jul"),
    month("Agustus", "Agu"),
    month("September", "Sep"),
    month("Oktober", "Okt"),
    month("November", "Nov"),
    month("Desember", "Des"),
];

pub const EVEN_SEMESTER: [SemesterMonth; 6] = [
    month("Januari", "Jan"),
    month("Februari", "Feb"),
    month("Maret", "Mar"),
    month("April", "Apr"),
    month("Mei", "Mei"),
    month("Juni", "Jun"),
];

pub const WEEKS_PER_MONTH: u8 = 4;

/// Months of a semester; anything other than 1 is the even semester.
pub fn semester_months(semester: u8) -> &'static [SemesterMonth] {
    if semester == 1 {
        &ODD_SEMESTER
    } else {
        &EVEN_SEMESTER
    }
}

/// A parsed "Mon-N" schedule code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCode {
    /// Index into the semester's months
    pub month: usize,
    /// 1-based week of the month
    pub week: u8,
}

impl WeekCode {
    /// Parse a code against the months of `semester`. Case and surrounding
    /// whitespace are ignored; unknown months and weeks outside 1..=4 are not.
    pub fn parse(code: &str, semester: u8) -> Option<Self> {
        let (mon, week) = code.trim().split_once('-')?;
        let week: u8 = week.trim().parse().ok()?;
        if !(1..=WEEKS_PER_MONTH).contains(&week) {
            return None;
        }
        let month = semester_months(semester)
            .iter()
            .position(|m| m.code.eq_ignore_ascii_case(mon.trim()))?;
        Some(Self { month, week })
    }
}

/// Week codes of an entry that fall inside the semester grid.
pub fn scheduled_weeks(entry: &PromesEntry, semester: u8) -> Vec<WeekCode> {
    entry
        .weeks
        .iter()
        .filter_map(|code| {
            let parsed = WeekCode::parse(code, semester);
            if parsed.is_none() {
                log::debug!("ignoring week code '{}' outside semester {}", code, semester);
            }
            parsed
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SemesterPlan {
    pub semester: u8,
    pub entries: Vec<PromesEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramState {
    pub prota: Option<Vec<ProtaEntry>>,
    pub promes: Option<SemesterPlan>,
    pub is_generating: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    Annual,
    Semester,
}

impl ProgramKind {
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Annual => "Gagal membuat Prota",
            Self::Semester => "Gagal membuat Promes",
        }
    }
}

/// Ephemeral program views. Never persisted.
#[derive(Default)]
pub struct ProgramBoard {
    state: RwLock<ProgramState>,
}

impl ProgramBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ProgramState {
        self.state.read().clone()
    }

    /// Returns false when a program generation is already running.
    pub fn begin(&self) -> bool {
        let mut state = self.state.write();
        if state.is_generating {
            return false;
        }
        state.is_generating = true;
        state.error = None;
        true
    }

    pub fn finish_annual(&self, entries: Vec<ProtaEntry>) {
        let mut state = self.state.write();
        state.is_generating = false;
        state.prota = Some(entries);
    }

    pub fn finish_semester(&self, semester: u8, entries: Vec<PromesEntry>) {
        let mut state = self.state.write();
        state.is_generating = false;
        state.promes = Some(SemesterPlan { semester, entries });
    }

    /// End the running generation with the failure message for `kind`.
    pub fn fail(&self, kind: ProgramKind) {
        let mut state = self.state.write();
        state.is_generating = false;
        state.error = Some(kind.failure_message().to_string());
    }

    /// Close both views.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.prota = None;
        state.promes = None;
        state.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_code_parsing() {
        assert_eq!(WeekCode::parse("Feb-3", 2), Some(WeekCode { month: 1, week: 3 }));
        assert_eq!(WeekCode::parse(" mei-1 ", 2), Some(WeekCode { month: 4, week: 1 }));
        assert_eq!(WeekCode::parse("Okt-2", 1), Some(WeekCode { month: 3, week: 2 }));
        assert_eq!(WeekCode::parse("Okt-2", 2), None);
        assert_eq!(WeekCode::parse("Feb-5", 2), None);
        assert_eq!(WeekCode::parse("Feb", 2), None);
        assert_eq!(WeekCode::parse("Feb-x", 2), None);
    }

    #[test]
    fn test_scheduled_weeks_drop_invalid_codes() {
        let entry = PromesEntry {
            material: "Bangun Datar".to_string(),
            hours: 8,
            weeks: vec!["Jan-1".to_string(), "Jul-1".to_string(), "Jan-2".to_string()],
        };
        let weeks = scheduled_weeks(&entry, 2);
        assert_eq!(weeks.len(), 2);
        assert!(weeks.iter().all(|w| w.month == 0));
    }

    #[test]
    fn test_board_is_exclusive_and_records_failures() {
        let board = ProgramBoard::new();
        assert!(board.begin());
        assert!(!board.begin());
        board.fail(ProgramKind::Annual);
        let state = board.snapshot();
        assert!(!state.is_generating);
        assert_eq!(state.error.as_deref(), Some("Gagal membuat Prota"));

        assert!(board.begin());
        board.finish_semester(2, Vec::new());
        assert_eq!(board.snapshot().promes.map(|p| p.semester), Some(2));
        board.clear();
        assert!(board.snapshot().promes.is_none());
    }
}
