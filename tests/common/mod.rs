#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use async_trait::async_trait;
use parking_lot::Mutex;
use rpm_generator::persistence::MemoryBlobStorage;
use rpm_generator::suggestion::{GenerativeBackend, InlineImage, SuggestionError};
use rpm_generator::{AppConfig, AppState};
use serde_json::{json, Value};

/// Which request a JSON generation call belongs to, told apart by its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Topics,
    Objectives,
    LessonContent,
    AnnualProgram,
    SemesterProgram,
    Image,
}

pub fn classify(schema: &Value) -> CallKind {
    let required = |v: &Value, key: &str| {
        v["required"]
            .as_array()
            .is_some_and(|r| r.iter().any(|k| k == key))
    };

    if schema["type"] == "ARRAY" {
        let items = &schema["items"];
        if required(items, "chapter") {
            CallKind::Topics
        } else if required(items, "weeks") {
            CallKind::SemesterProgram
        } else {
            CallKind::AnnualProgram
        }
    } else if required(schema, "cp") {
        CallKind::Objectives
    } else {
        CallKind::LessonContent
    }
}

/// Backend that answers each call kind with a scripted reply.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<HashMap<CallKind, Result<String, u16>>>,
    image: Mutex<Option<Result<Option<InlineImage>, u16>>>,
    delays: Mutex<HashMap<CallKind, Duration>>,
    calls: Mutex<Vec<(CallKind, String)>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, kind: CallKind, body: Value) {
        self.replies.lock().insert(kind, Ok(body.to_string()));
    }

    pub fn reply_raw(&self, kind: CallKind, body: &str) {
        self.replies.lock().insert(kind, Ok(body.to_string()));
    }

    pub fn fail(&self, kind: CallKind, status: u16) {
        if kind == CallKind::Image {
            *self.image.lock() = Some(Err(status));
        } else {
            self.replies.lock().insert(kind, Err(status));
        }
    }

    pub fn image(&self, image: Option<InlineImage>) {
        *self.image.lock() = Some(Ok(image));
    }

    pub fn delay(&self, kind: CallKind, delay: Duration) {
        self.delays.lock().insert(kind, delay);
    }

    pub fn calls(&self, kind: CallKind) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }

    async fn record(&self, kind: CallKind, prompt: &str) {
        self.calls.lock().push((kind, prompt.to_string()));
        let delay = self.delays.lock().get(&kind).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn unavailable(status: u16) -> SuggestionError {
    SuggestionError::Api {
        status,
        message: "scripted failure".to_string(),
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate_json(
        &self,
        _model: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, SuggestionError> {
        let kind = classify(schema);
        self.record(kind, prompt).await;
        let reply = self.replies.lock().get(&kind).cloned();
        match reply {
            Some(reply) => reply.map_err(unavailable),
            None => Err(unavailable(503)),
        }
    }

    async fn generate_image(
        &self,
        _model: &str,
        prompt: &str,
    ) -> Result<Option<InlineImage>, SuggestionError> {
        self.record(CallKind::Image, prompt).await;
        let image = self.image.lock().clone();
        image.unwrap_or(Ok(None)).map_err(unavailable)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|name| match name {
        "GEMINI_API_KEY" => Some("test-key".to_string()),
        "PLACEHOLDER_IMAGE_BASE" => Some("https://placeholder.test".to_string()),
        _ => None,
    })
    .expect("test config")
}

pub async fn test_state(
    backend: Arc<ScriptedBackend>,
    storage: Arc<MemoryBlobStorage>,
) -> web::Data<AppState> {
    let state = AppState::with_parts(test_config(), backend, storage).await;
    web::Data::new(state)
}

/// Poll until no objective prefill is running.
pub async fn wait_for_prefill(state: &AppState) {
    for _ in 0..100 {
        if !state.form.snapshot().is_prefilling {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("prefill did not finish");
}

pub fn objectives_reply() -> Value {
    json!({
        "cp": "Peserta didik dapat menentukan luas dan keliling bangun datar.",
        "tp": [
            "Menghitung keliling persegi dan persegi panjang",
            "Menghitung luas persegi dan persegi panjang"
        ],
        "dimensions": ["penalaran kritis", "Kolaborasi", "Bukan Dimensi"],
        "suggestedMeetings": 2,
        "suggestedPedagogy": ["Discovery Learning"]
    })
}

fn framing(steps: &str) -> Value {
    json!({ "steps": steps, "duration": "10 menit" })
}

fn phase(kind: &str, steps: &str) -> Value {
    json!({ "type": kind, "steps": steps, "duration": "15 menit" })
}

fn assessment(technique: &str) -> Value {
    json!({ "technique": technique, "instrument": "Lembar observasi", "rubric": "Skala 1-4" })
}

/// A complete lesson content reply with `meetings` meetings.
pub fn content_reply(meetings: usize) -> Value {
    let meeting = json!({
        "opening": framing("Salam dan apersepsi"),
        "understand": phase("Berkesadaran", "Mengamati benda berbentuk persegi"),
        "apply": phase("Bermakna", "Mengukur meja kelas"),
        "reflect": phase("Menggembirakan", "Berbagi hasil pengukuran"),
        "closing": framing("Doa penutup"),
    });

    json!({
        "students": "Peserta didik kelas 4 dengan minat beragam.",
        "interdisciplinary": "Seni Rupa",
        "partnership": "Orang tua",
        "environment": "Ruang kelas",
        "digitalTools": "Video pembelajaran",
        "summary": "Luas adalah ukuran daerah; keliling adalah panjang batas.",
        "meetings": vec![meeting; meetings],
        "assessments": {
            "initial": assessment("Tanya jawab"),
            "process": assessment("Observasi"),
            "final": assessment("Tes tertulis")
        },
        "lkpd": "Ukurlah panjang dan lebar buku tulismu.",
        "formativeQuestions": [{
            "question": "Keliling persegi bersisi 4 cm adalah",
            "options": { "a": "8 cm", "b": "12 cm", "c": "16 cm", "d": "20 cm" },
            "answer": "C"
        }]
    })
}
