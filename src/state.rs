//! Shared application state handed to every handler as `web::Data<AppState>`.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::config::AppConfig;
use crate::form::{FormStore, LessonPlanForm};
use crate::library::{LibraryEntry, LibraryStore};
use crate::persistence::{
    load_json, spawn_persistence_worker, BlobStorage, FileBlobStorage, FORM_DRAFT_KEY, LIBRARY_KEY,
};
use crate::prefill::PrefillOrchestrator;
use crate::program::ProgramBoard;
use crate::render::RenderContext;
use crate::suggestion::types::ChapterInfo;
use crate::suggestion::{GeminiBackend, GenerativeBackend, SuggestionClient};

/// (subject, grade, search query)
pub type TopicQuery = (String, String, String);

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub form: Arc<FormStore>,
    pub library: Arc<LibraryStore>,
    pub programs: Arc<ProgramBoard>,
    pub suggestions: SuggestionClient,
    pub prefill: Arc<PrefillOrchestrator>,
    pub topic_cache: Cache<TopicQuery, Vec<ChapterInfo>>,
}

impl AppState {
    /// Production state: Gemini over HTTP, blobs under the data directory.
    pub async fn new(config: AppConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(config.gemini.timeout)
            .pool_idle_timeout(Duration::from_secs(900))
            .user_agent(concat!("rpm-generator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let backend = Arc::new(GeminiBackend::new(http_client, &config.gemini));
        let storage = Arc::new(FileBlobStorage::new(config.data_dir.clone()));

        Ok(Self::with_parts(config, backend, storage).await)
    }

    /// State over an arbitrary backend and storage.
    pub async fn with_parts(
        config: AppConfig,
        backend: Arc<dyn GenerativeBackend>,
        storage: Arc<dyn BlobStorage>,
    ) -> Self {
        let defaults = LessonPlanForm::default().with_school_name(config.school.name.clone());

        let draft: Option<LessonPlanForm> = load_json(storage.as_ref(), FORM_DRAFT_KEY).await;
        if draft.is_some() {
            log::info!("Restored saved form draft");
        }
        let form = Arc::new(FormStore::with_draft(defaults, draft));

        let entries: Vec<LibraryEntry> = load_json(storage.as_ref(), LIBRARY_KEY)
            .await
            .unwrap_or_default();
        log::info!("Loaded {} library entries", entries.len());
        let library = Arc::new(LibraryStore::new(entries));

        let draft_sender = spawn_persistence_worker::<LessonPlanForm>(FORM_DRAFT_KEY, storage.clone());
        form.subscribe(Box::new(move |form| {
            if draft_sender.send(form.clone()).is_err() {
                log::error!("Form draft persistence worker is gone");
            }
        }));

        let library_sender =
            spawn_persistence_worker::<Vec<LibraryEntry>>(LIBRARY_KEY, storage.clone());
        library.subscribe(Box::new(move |entries| {
            if library_sender.send(entries.to_vec()).is_err() {
                log::error!("Library persistence worker is gone");
            }
        }));

        let suggestions = SuggestionClient::new(
            backend,
            config.gemini.models.clone(),
            config.placeholder_image_base.clone(),
        );
        let prefill = Arc::new(PrefillOrchestrator::new(form.clone(), suggestions.clone()));

        let topic_cache = Cache::builder()
            .time_to_live(Duration::from_secs(10 * 60))
            .max_capacity(100)
            .build();

        Self {
            config,
            form,
            library,
            programs: Arc::new(ProgramBoard::new()),
            suggestions,
            prefill,
            topic_cache,
        }
    }

    pub fn render_context(&self) -> RenderContext {
        RenderContext::today(self.config.school.signing_place.clone())
    }
}
