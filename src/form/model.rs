use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const TEACHERS: &[&str] = &[
    "Nasriwanto, S.Pd",
    "Raynaldi, S.Pd",
    "Randi Maikel, S.Or",
    "Nilam Melani Putri, S.Pd",
    "Lelis Mawati, S.Pd",
    "Raflinda Roza, S.Pd",
    "Sarwenda, S.PdI",
];

pub const SD_GRADES: &[&str] = &["Kelas 4", "Kelas 5", "Kelas 6"];

pub const SD_SUBJECTS: &[&str] = &[
    "Pendidikan Agama Islam dan Budi Pekerti",
    "Pendidikan Pancasila",
    "Bahasa Indonesia",
    "Matematika",
    "Ilmu Pengetahuan Alam dan Sosial (IPAS)",
    "Seni Musik",
    "Seni Rupa",
    "Pendidikan Jasmani, Olahraga, dan Kesehatan (PJOK)",
    "Bahasa Inggris",
    "Muatan Lokal",
];

/// Closed set of labels that AI suggestions are normalised against.
pub trait TagLabel: Sized + Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tag| tag.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PedagogicalPractice {
    #[serde(rename = "Pembelajaran Berbasis Proyek (PjBL)")]
    ProjectBased,
    #[serde(rename = "Pembelajaran Berbasis Masalah (PBL)")]
    ProblemBased,
    #[serde(rename = "Discovery Learning")]
    Discovery,
    #[serde(rename = "Inquiry Learning")]
    Inquiry,
    #[serde(rename = "Pembelajaran Kooperatif")]
    Cooperative,
    #[serde(rename = "Pembelajaran Berdiferensiasi")]
    Differentiated,
    #[serde(rename = "Teaching at the Right Level (TaRL)")]
    RightLevel,
    #[serde(rename = "Culturally Responsive Teaching (CRT)")]
    CulturallyResponsive,
}

impl TagLabel for PedagogicalPractice {
    const ALL: &'static [Self] = &[
        Self::ProjectBased,
        Self::ProblemBased,
        Self::Discovery,
        Self::Inquiry,
        Self::Cooperative,
        Self::Differentiated,
        Self::RightLevel,
        Self::CulturallyResponsive,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::ProjectBased => "Pembelajaran Berbasis Proyek (PjBL)",
            Self::ProblemBased => "Pembelajaran Berbasis Masalah (PBL)",
            Self::Discovery => "Discovery Learning",
            Self::Inquiry => "Inquiry Learning",
            Self::Cooperative => "Pembelajaran Kooperatif",
            Self::Differentiated => "Pembelajaran Berdiferensiasi",
            Self::RightLevel => "Teaching at the Right Level (TaRL)",
            Self::CulturallyResponsive => "Culturally Responsive Teaching (CRT)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum GraduateDimension {
    #[serde(rename = "Keimanan & Ketakwaan")]
    Faith,
    #[serde(rename = "Kewargaan")]
    Citizenship,
    #[serde(rename = "Penalaran Kritis")]
    CriticalReasoning,
    #[serde(rename = "Kreativitas")]
    Creativity,
    #[serde(rename = "Kolaborasi")]
    Collaboration,
    #[serde(rename = "Kemandirian")]
    Independence,
    #[serde(rename = "Kesehatan")]
    Health,
    #[serde(rename = "Komunikasi")]
    Communication,
}

impl TagLabel for GraduateDimension {
    const ALL: &'static [Self] = &[
        Self::Faith,
        Self::Citizenship,
        Self::CriticalReasoning,
        Self::Creativity,
        Self::Collaboration,
        Self::Independence,
        Self::Health,
        Self::Communication,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Faith => "Keimanan & Ketakwaan",
            Self::Citizenship => "Kewargaan",
            Self::CriticalReasoning => "Penalaran Kritis",
            Self::Creativity => "Kreativitas",
            Self::Collaboration => "Kolaborasi",
            Self::Independence => "Kemandirian",
            Self::Health => "Kesehatan",
            Self::Communication => "Komunikasi",
        }
    }
}

/// Lesson plan input form. Field names match the persisted draft format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanForm {
    pub school_name: String,
    pub teacher_name: String,
    pub teacher_nip: String,
    pub principal_name: String,
    pub principal_nip: String,
    pub grade: String,
    pub academic_year: String,
    pub subject: String,
    /// Capaian Pembelajaran
    pub cp: String,
    /// Tujuan Pembelajaran, one goal per line
    pub tp: String,
    pub material: String,
    pub meeting_count: u32,
    pub duration: String,
    #[serde(default)]
    pub pedagogy: Vec<PedagogicalPractice>,
    #[serde(default)]
    pub dimensions: Vec<GraduateDimension>,
}

impl Default for LessonPlanForm {
    fn default() -> Self {
        Self {
            school_name: "SDN 14 Andopan".to_string(),
            teacher_name: TEACHERS[0].to_string(),
            teacher_nip: "19XXXXXXXXXXXXX".to_string(),
            principal_name: "Drs. H. Ahmad".to_string(),
            principal_nip: "19XXXXXXXXXXXXX".to_string(),
            grade: "Kelas 4".to_string(),
            academic_year: "2025/2026".to_string(),
            subject: "Bahasa Indonesia".to_string(),
            cp: String::new(),
            tp: String::new(),
            material: String::new(),
            meeting_count: 2,
            duration: "2 x 35 menit".to_string(),
            pedagogy: Vec::new(),
            dimensions: Vec::new(),
        }
    }
}

impl LessonPlanForm {
    pub fn with_school_name(mut self, school_name: impl Into<String>) -> Self {
        self.school_name = school_name.into();
        self
    }

    /// The (subject, grade, material) triple that drives prefill.
    pub fn prefill_key(&self) -> PrefillKey {
        PrefillKey {
            subject: self.subject.clone(),
            grade: self.grade.clone(),
            material: self.material.clone(),
        }
    }

    /// Objective and learning-goal fields are both still empty.
    pub fn has_blank_objectives(&self) -> bool {
        self.cp.trim().is_empty() && self.tp.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrefillKey {
    pub subject: String,
    pub grade: String,
    pub material: String,
}

/// Scalar fields addressable by name from the form UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    SchoolName,
    TeacherName,
    TeacherNip,
    PrincipalName,
    PrincipalNip,
    Grade,
    AcademicYear,
    Subject,
    Cp,
    Tp,
    Material,
    MeetingCount,
    Duration,
}

impl FormField {
    pub fn parse(name: &str) -> Option<Self> {
        let field = match name {
            "schoolName" => Self::SchoolName,
            "teacherName" => Self::TeacherName,
            "teacherNip" => Self::TeacherNip,
            "principalName" => Self::PrincipalName,
            "principalNip" => Self::PrincipalNip,
            "grade" => Self::Grade,
            "academicYear" => Self::AcademicYear,
            "subject" => Self::Subject,
            "cp" => Self::Cp,
            "tp" => Self::Tp,
            "material" => Self::Material,
            "meetingCount" => Self::MeetingCount,
            "duration" => Self::Duration,
            _ => return None,
        };
        Some(field)
    }

    /// Write `value` into `form`, coercing where the field is numeric.
    pub fn apply(self, form: &mut LessonPlanForm, value: &str) {
        let slot = match self {
            Self::MeetingCount => {
                form.meeting_count = coerce_meeting_count(value);
                return;
            }
            Self::SchoolName => &mut form.school_name,
            Self::TeacherName => &mut form.teacher_name,
            Self::TeacherNip => &mut form.teacher_nip,
            Self::PrincipalName => &mut form.principal_name,
            Self::PrincipalNip => &mut form.principal_nip,
            Self::Grade => &mut form.grade,
            Self::AcademicYear => &mut form.academic_year,
            Self::Subject => &mut form.subject,
            Self::Cp => &mut form.cp,
            Self::Tp => &mut form.tp,
            Self::Material => &mut form.material,
            Self::Duration => &mut form.duration,
        };
        *slot = value.to_string();
    }
}

/// Leading-integer parse saturating at `u32::MAX`; anything below 1 becomes 1.
pub fn coerce_meeting_count(value: &str) -> u32 {
    value
        .trim()
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0u32, |n, d| n.saturating_mul(10).saturating_add(d))
        .max(1)
}

/// Partial form update. Absent fields are left untouched by a merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormPatch {
    pub school_name: Option<String>,
    pub teacher_name: Option<String>,
    pub teacher_nip: Option<String>,
    pub principal_name: Option<String>,
    pub principal_nip: Option<String>,
    pub grade: Option<String>,
    pub academic_year: Option<String>,
    pub subject: Option<String>,
    pub cp: Option<String>,
    pub tp: Option<String>,
    pub material: Option<String>,
    pub meeting_count: Option<u32>,
    pub duration: Option<String>,
    pub pedagogy: Option<Vec<PedagogicalPractice>>,
    pub dimensions: Option<Vec<GraduateDimension>>,
}

impl FormPatch {
    pub fn apply_to(&self, form: &mut LessonPlanForm) {
        fn set(slot: &mut String, value: &Option<String>) {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }

        set(&mut form.school_name, &self.school_name);
        set(&mut form.teacher_name, &self.teacher_name);
        set(&mut form.teacher_nip, &self.teacher_nip);
        set(&mut form.principal_name, &self.principal_name);
        set(&mut form.principal_nip, &self.principal_nip);
        set(&mut form.grade, &self.grade);
        set(&mut form.academic_year, &self.academic_year);
        set(&mut form.subject, &self.subject);
        set(&mut form.cp, &self.cp);
        set(&mut form.tp, &self.tp);
        set(&mut form.material, &self.material);
        set(&mut form.duration, &self.duration);
        if let Some(count) = self.meeting_count {
            form.meeting_count = count.max(1);
        }
        if let Some(pedagogy) = &self.pedagogy {
            form.pedagogy = dedup(pedagogy);
        }
        if let Some(dimensions) = &self.dimensions {
            form.dimensions = dedup(dimensions);
        }
    }
}

fn dedup<T: PartialEq + Copy>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(*item);
        }
    }
    out
}

/// Insert `tag` if absent, remove it if present.
pub fn toggle_tag<T: PartialEq + Copy>(tags: &mut Vec<T>, tag: T) {
    if let Some(pos) = tags.iter().position(|t| *t == tag) {
        tags.remove(pos);
    } else {
        tags.push(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_count_coercion() {
        assert_eq!(coerce_meeting_count("3"), 3);
        assert_eq!(coerce_meeting_count(" 4 pertemuan"), 4);
        assert_eq!(coerce_meeting_count("0"), 1);
        assert_eq!(coerce_meeting_count(""), 1);
        assert_eq!(coerce_meeting_count("abc"), 1);
        assert_eq!(coerce_meeting_count("-2"), 1);
        assert_eq!(coerce_meeting_count("99999999999"), u32::MAX);
    }

    #[test]
    fn test_field_names_match_draft_keys() {
        let json = serde_json::to_value(LessonPlanForm::default()).unwrap();
        for name in [
            "schoolName",
            "teacherName",
            "meetingCount",
            "academicYear",
            "cp",
            "tp",
            "material",
        ] {
            assert!(json.get(name).is_some(), "missing key {name}");
            if name != "meetingCount" {
                assert!(FormField::parse(name).is_some());
            }
        }
        assert!(FormField::parse("pedagogy").is_none());
        assert!(FormField::parse("unknown").is_none());
    }

    #[test]
    fn test_tags_serialize_as_labels() {
        let json = serde_json::to_string(&vec![GraduateDimension::Faith]).unwrap();
        assert_eq!(json, r#"["Keimanan & Ketakwaan"]"#);
        for tag in PedagogicalPractice::ALL {
            let value = serde_json::to_value(tag).unwrap();
            assert_eq!(value.as_str(), Some(tag.label()));
            assert_eq!(PedagogicalPractice::from_label(tag.label()), Some(*tag));
        }
    }

    #[test]
    fn test_toggle_tag_is_set_membership() {
        let mut tags = Vec::new();
        toggle_tag(&mut tags, GraduateDimension::Creativity);
        toggle_tag(&mut tags, GraduateDimension::Health);
        toggle_tag(&mut tags, GraduateDimension::Creativity);
        assert_eq!(tags, vec![GraduateDimension::Health]);
    }

    #[test]
    fn test_patch_leaves_absent_fields() {
        let mut form = LessonPlanForm {
            teacher_name: "Raynaldi, S.Pd".to_string(),
            ..LessonPlanForm::default()
        };
        let patch = FormPatch {
            subject: Some("Matematika".to_string()),
            meeting_count: Some(0),
            dimensions: Some(vec![GraduateDimension::Health, GraduateDimension::Health]),
            ..FormPatch::default()
        };
        patch.apply_to(&mut form);
        assert_eq!(form.subject, "Matematika");
        assert_eq!(form.teacher_name, "Raynaldi, S.Pd");
        assert_eq!(form.meeting_count, 1);
        assert_eq!(form.dimensions, vec![GraduateDimension::Health]);
    }
}
