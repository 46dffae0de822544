use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::types::ChapterInfo;
use crate::form::model::{TagLabel, SD_GRADES, SD_SUBJECTS, TEACHERS};
use crate::form::{GraduateDimension, PedagogicalPractice};
use crate::program::{SemesterMonth, EVEN_SEMESTER, ODD_SEMESTER};
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SemesterMonths {
    pub odd: Vec<SemesterMonth>,
    pub even: Vec<SemesterMonth>,
}

/// Fixed choices offered by the form UI.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub subjects: Vec<&'static str>,
    pub grades: Vec<&'static str>,
    pub teachers: Vec<&'static str>,
    pub pedagogy: Vec<&'static str>,
    pub dimensions: Vec<&'static str>,
    pub semester_months: SemesterMonths,
}

impl OptionsResponse {
    pub fn build() -> Self {
        Self {
            subjects: SD_SUBJECTS.to_vec(),
            grades: SD_GRADES.to_vec(),
            teachers: TEACHERS.to_vec(),
            pedagogy: PedagogicalPractice::ALL.iter().map(|t| t.label()).collect(),
            dimensions: GraduateDimension::ALL.iter().map(|t| t.label()).collect(),
            semester_months: SemesterMonths {
                odd: ODD_SEMESTER.to_vec(),
                even: EVEN_SEMESTER.to_vec(),
            },
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TopicQueryParams {
    /// Defaults to the form's subject
    pub subject: Option<String>,
    /// Defaults to the form's grade
    pub grade: Option<String>,
    pub search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/options",
    tag = "Suggestions",
    responses(
        (status = 200, description = "Form choices", body = OptionsResponse)
    )
)]
pub async fn get_options() -> impl Responder {
    HttpResponse::Ok().json(OptionsResponse::build())
}

#[utoipa::path(
    get,
    path = "/api/topics",
    tag = "Suggestions",
    params(TopicQueryParams),
    responses(
        (status = 200, description = "Chapters and materials; empty when unavailable", body = Vec<ChapterInfo>)
    )
)]
pub async fn get_topics(
    state: web::Data<AppState>,
    query: web::Query<TopicQueryParams>,
) -> impl Responder {
    let form = state.form.form();
    let subject = query.subject.clone().unwrap_or(form.subject);
    let grade = query.grade.clone().unwrap_or(form.grade);
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let key = (subject.clone(), grade.clone(), search.to_lowercase());
    if let Some(cached) = state.topic_cache.get(&key).await {
        log::debug!("Topic cache hit for {} / {}", subject, grade);
        return HttpResponse::Ok().json(cached);
    }

    let fetch = state.form.begin_topic_fetch();
    let search = (!search.is_empty()).then_some(search.as_str());
    let topics = state.suggestions.list_topics(&subject, &grade, search).await;
    drop(fetch);

    if !topics.is_empty() {
        state.topic_cache.insert(key, topics.clone()).await;
    }

    log::info!("Fetched {} chapters for {} / {}", topics.len(), subject, grade);
    HttpResponse::Ok().json(topics)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/options").route(web::get().to(get_options)))
        .service(web::resource("/topics").route(web::get().to(get_topics)));
}
