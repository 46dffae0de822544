use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Opening or closing activity of a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FramingActivity {
    pub steps: String,
    pub duration: String,
}

/// Understand / apply / reflect phase of a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CorePhase {
    /// Learning approach used in the phase
    #[serde(rename = "type")]
    pub approach: String,
    pub steps: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Meeting {
    pub opening: FramingActivity,
    pub understand: CorePhase,
    pub apply: CorePhase,
    pub reflect: CorePhase,
    pub closing: FramingActivity,
}

impl Meeting {
    /// First activity whose steps are blank, if any.
    pub fn blank_steps(&self) -> Option<&'static str> {
        [
            ("opening", &self.opening.steps),
            ("understand", &self.understand.steps),
            ("apply", &self.apply.steps),
            ("reflect", &self.reflect.steps),
            ("closing", &self.closing.steps),
        ]
        .into_iter()
        .find(|(_, steps)| steps.trim().is_empty())
        .map(|(name, _)| name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssessmentItem {
    pub technique: String,
    pub instrument: String,
    pub rubric: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Assessments {
    pub initial: AssessmentItem,
    pub process: AssessmentItem,
    #[serde(rename = "final")]
    pub summative: AssessmentItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuestionOptions {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKey {
    #[serde(alias = "A")]
    A,
    #[serde(alias = "B")]
    B,
    #[serde(alias = "C")]
    C,
    #[serde(alias = "D")]
    D,
}

impl AnswerKey {
    pub fn letter(&self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormativeQuestion {
    pub question: String,
    pub options: QuestionOptions,
    pub answer: AnswerKey,
}

/// Full lesson content produced by one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub students: String,
    pub interdisciplinary: String,
    pub partnership: String,
    pub environment: String,
    pub digital_tools: String,
    pub summary: String,
    pub meetings: Vec<Meeting>,
    pub assessments: Assessments,
    /// Lembar Kerja Peserta Didik
    pub lkpd: String,
    pub formative_questions: Vec<FormativeQuestion>,
}

/// Curriculum objectives suggested for a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveSuggestion {
    pub cp: String,
    pub tp: Vec<String>,
    pub dimensions: Vec<String>,
    pub suggested_meetings: i64,
    pub suggested_pedagogy: Vec<String>,
}

impl ObjectiveSuggestion {
    /// Learning goals as numbered lines: "1. ...\n2. ...".
    pub fn numbered_goals(&self) -> String {
        self.tp
            .iter()
            .map(|goal| goal.trim())
            .filter(|goal| !goal.is_empty())
            .enumerate()
            .map(|(i, goal)| format!("{}. {}", i + 1, goal))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn meeting_count(&self) -> Option<u32> {
        u32::try_from(self.suggested_meetings).ok().filter(|n| *n > 0)
    }
}

/// Topic catalog entry used to populate topic selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChapterInfo {
    pub chapter: String,
    pub title: String,
    pub materials: Vec<String>,
}

/// Annual program row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProtaEntry {
    pub material: String,
    pub hours: u32,
    pub semester: u8,
}

/// Semester program row; `weeks` holds codes such as "Feb-3".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PromesEntry {
    pub material: String,
    pub hours: u32,
    pub weeks: Vec<String>,
}
