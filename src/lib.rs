use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod export;
pub mod form;
pub mod library;
pub mod persistence;
pub mod prefill;
pub mod program;
pub mod render;
pub mod state;
pub mod suggestion;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

use crate::form::validation::ValidationError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
    /// Per-field problems for validation failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ValidationError>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: Vec::new(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn conflict(message: &str) -> Self {
        Self::new("Conflict", message)
    }

    /// The AI service failed or returned something unusable.
    pub fn upstream(message: &str) -> Self {
        Self::new("UpstreamError", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn validation(errors: &form::validation::ValidationErrors) -> Self {
        Self {
            details: errors.errors.clone(),
            ..Self::new("ValidationError", "Data formulir belum lengkap.")
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::form::routes::get_form,
        crate::form::routes::update_field,
        crate::form::routes::toggle_tag,
        crate::form::routes::merge_form,
        crate::form::routes::reset_form,
        crate::form::routes::generate,
        crate::form::routes::refresh_illustration,
        crate::suggestion::routes::get_options,
        crate::suggestion::routes::get_topics,
        crate::library::routes::list_entries,
        crate::library::routes::save_entry,
        crate::library::routes::delete_entry,
        crate::library::routes::load_entry,
        crate::program::routes::get_programs,
        crate::program::routes::generate_annual,
        crate::program::routes::generate_semester,
        crate::program::routes::close_programs,
        crate::export::routes::preview,
        crate::export::routes::export_pdf,
        crate::export::routes::export_word,
        crate::export::routes::export_print
    ),
    components(
        schemas(
            form::LessonPlanForm,
            form::FormPatch,
            form::FormState,
            form::PedagogicalPractice,
            form::GraduateDimension,
            form::routes::FieldUpdate,
            form::routes::TagToggle,
            form::routes::TagKind,
            form::validation::ValidationError,
            suggestion::types::GeneratedContent,
            suggestion::types::Meeting,
            suggestion::types::FramingActivity,
            suggestion::types::CorePhase,
            suggestion::types::Assessments,
            suggestion::types::AssessmentItem,
            suggestion::types::FormativeQuestion,
            suggestion::types::QuestionOptions,
            suggestion::types::AnswerKey,
            suggestion::types::ChapterInfo,
            suggestion::types::ProtaEntry,
            suggestion::types::PromesEntry,
            suggestion::routes::OptionsResponse,
            suggestion::routes::SemesterMonths,
            library::LibraryEntry,
            program::ProgramState,
            program::SemesterPlan,
            program::SemesterMonth,
            program::routes::SemesterRequest,
            export::ExportTarget,
            export::PdfMode,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Form", description = "Lesson plan form state and generation."),
        (name = "Suggestions", description = "Options and AI topic suggestions."),
        (name = "Library", description = "Saved curriculum snippets."),
        (name = "Programs", description = "Annual and semester programs."),
        (name = "Export", description = "Preview, PDF, Word and print output.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Local server")
    )
)]
pub struct ApiDoc;

/// Register every `/api` route.
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(form::routes::config)
            .configure(suggestion::routes::config)
            .configure(library::routes::config)
            .configure(program::routes::config)
            .configure(export::routes::config),
    );
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let bind = (config.host.clone(), config.port);
    let app_state = web::Data::new(AppState::new(config).await?);

    let prometheus = PrometheusMetricsBuilder::new("rpm_generator")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {e}"))?;

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(api_config)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
