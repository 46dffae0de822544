//! Runtime configuration loaded from the environment (and `.env` via dotenvy).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::export::pdf::PageFormat;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_CONTENT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_PLACEHOLDER_BASE: &str = "https://picsum.photos";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),
    #[error("environment variable {name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Models used per generation call type.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub text: String,
    pub content: String,
    pub image: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT_MODEL.to_string(),
            content: DEFAULT_CONTENT_MODEL.to_string(),
            image: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub models: ModelConfig,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct PdfConfig {
    pub page: PageFormat,
    pub margin_mm: u32,
    pub typst_bin: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            page: PageFormat::A4,
            margin_mm: 5,
            typst_bin: "typst".to_string(),
        }
    }
}

/// School identity used for form defaults and signature blocks.
#[derive(Debug, Clone)]
pub struct SchoolConfig {
    pub name: String,
    pub signing_place: String,
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            name: "SDN 14 Andopan".to_string(),
            signing_place: "Andopan".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub placeholder_image_base: String,
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub pdf: PdfConfig,
    pub school: SchoolConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let timeout_secs = parse_or("AI_TIMEOUT_SECS", get("AI_TIMEOUT_SECS"), 120u64)?;
        let port = parse_or("SERVER_PORT", get("SERVER_PORT"), 8080u16)?;
        let margin_mm = parse_or("PDF_MARGIN_MM", get("PDF_MARGIN_MM"), 5u32)?;

        let page = match get("PDF_PAGE_FORMAT") {
            Some(value) => PageFormat::parse(&value).ok_or(ConfigError::Invalid {
                name: "PDF_PAGE_FORMAT",
                value,
            })?,
            None => PageFormat::A4,
        };

        let defaults = ModelConfig::default();
        let school = SchoolConfig::default();

        Ok(Self {
            gemini: GeminiConfig {
                api_key: api_key.trim().to_string(),
                base_url: get("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                models: ModelConfig {
                    text: get("GEMINI_TEXT_MODEL").unwrap_or(defaults.text),
                    content: get("GEMINI_CONTENT_MODEL").unwrap_or(defaults.content),
                    image: get("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image),
                },
                timeout: Duration::from_secs(timeout_secs),
            },
            placeholder_image_base: get("PLACEHOLDER_IMAGE_BASE")
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            data_dir: PathBuf::from(get("RPM_DATA_DIR").unwrap_or_else(|| "./data".to_string())),
            host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            pdf: PdfConfig {
                page,
                margin_mm,
                typst_bin: get("TYPST_BIN").unwrap_or_else(|| "typst".to_string()),
            },
            school: SchoolConfig {
                name: get("SCHOOL_NAME").unwrap_or(school.name),
                signing_place: get("SIGNING_PLACE").unwrap_or(school.signing_place),
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
