mod common;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{http::StatusCode, test, App};
use rpm_generator::api_config;
use rpm_generator::form::{GraduateDimension, PedagogicalPractice};
use rpm_generator::persistence::MemoryBlobStorage;
use rpm_generator::suggestion::InlineImage;
use serde_json::{json, Value};

use common::{content_reply, objectives_reply, test_state, wait_for_prefill, CallKind, ScriptedBackend};

const MATERIAL: &str = "Luas dan Keliling Bangun Datar";

fn set_field(field: &str, value: &str) -> test::TestRequest {
    test::TestRequest::put()
        .uri("/api/form/fields")
        .set_json(json!({ "field": field, "value": value }))
}

#[actix_web::test]
async fn test_prefill_then_generate_lesson_plan() {
    let backend = ScriptedBackend::new();
    backend.reply(CallKind::Objectives, objectives_reply());
    backend.reply(CallKind::LessonContent, content_reply(2));
    backend.image(Some(InlineImage {
        mime_type: "image/png".to_string(),
        data: "iVBORw0KGgo=".to_string(),
    }));
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    for (field, value) in [("subject", "Matematika"), ("grade", "Kelas 4")] {
        let resp = test::call_service(&app, set_field(field, value).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert!(backend.calls(CallKind::Objectives).is_empty());

    let resp = test::call_service(&app, set_field("material", MATERIAL).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    wait_for_prefill(&state).await;

    let form = state.form.form();
    assert_eq!(backend.calls(CallKind::Objectives).len(), 1);
    assert!(backend.calls(CallKind::Objectives)[0].contains(MATERIAL));
    assert!(form.cp.starts_with("Peserta didik"));
    assert_eq!(
        form.tp,
        "1. Menghitung keliling persegi dan persegi panjang\n2. Menghitung luas persegi dan persegi panjang"
    );
    assert_eq!(
        form.dimensions,
        vec![GraduateDimension::CriticalReasoning, GraduateDimension::Collaboration]
    );
    assert_eq!(form.pedagogy, vec![PedagogicalPractice::Discovery]);
    assert_eq!(form.meeting_count, 2);

    let req = test::TestRequest::post().uri("/api/form/generate").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["isGenerating"], false);
    assert_eq!(body["generatedContent"]["meetings"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["generatedImageUrl"],
        "data:image/png;base64,iVBORw0KGgo="
    );

    let req = test::TestRequest::get().uri("/api/preview/lesson-plan").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("RENCANA PEMBELAJARAN MENDALAM (RPM)"));
    assert!(html.contains("SESI PERTEMUAN KE-2"));

    let req = test::TestRequest::get()
        .uri("/api/export/lesson-plan/word")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("RPM_2025_Luas_dan_Keliling_Bangun_Datar.doc"));
}

#[actix_web::test]
async fn test_no_prefill_when_objectives_present() {
    let backend = ScriptedBackend::new();
    backend.reply(CallKind::Objectives, objectives_reply());
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    let req = test::TestRequest::post()
        .uri("/api/form/merge")
        .set_json(json!({ "cp": "CP sendiri" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, set_field("material", MATERIAL).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["isPrefilling"], false);
    assert_eq!(body["formData"]["cp"], "CP sendiri");
    assert!(backend.calls(CallKind::Objectives).is_empty());
}

#[actix_web::test]
async fn test_prefill_failure_sets_error() {
    let backend = ScriptedBackend::new();
    backend.fail(CallKind::Objectives, 500);
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    test::call_service(&app, set_field("material", MATERIAL).to_request()).await;
    wait_for_prefill(&state).await;

    let snapshot = state.form.snapshot();
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Gagal memproses data otomatis dari AI.")
    );
    assert!(snapshot.form_data.cp.is_empty());
}

#[actix_web::test]
async fn test_stale_prefill_is_discarded() {
    let backend = ScriptedBackend::new();
    backend.reply(CallKind::Objectives, objectives_reply());
    backend.delay(CallKind::Objectives, Duration::from_millis(100));
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    test::call_service(&app, set_field("material", "Pecahan").to_request()).await;
    test::call_service(&app, set_field("material", MATERIAL).to_request()).await;
    // Typing the objectives by hand while the second request is in flight
    test::call_service(&app, set_field("cp", "CP guru").to_request()).await;
    wait_for_prefill(&state).await;

    let form = state.form.form();
    assert_eq!(backend.calls(CallKind::Objectives).len(), 2);
    assert_eq!(form.material, MATERIAL);
    assert_eq!(form.cp, "CP guru");
    assert!(form.tp.starts_with("1. Menghitung keliling"));
    assert!(state.form.snapshot().error.is_none());
}

#[actix_web::test]
async fn test_generate_requires_material() {
    let backend = ScriptedBackend::new();
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    let req = test::TestRequest::post().uri("/api/form/generate").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["details"][0]["field"], "material");
    assert!(backend.calls(CallKind::LessonContent).is_empty());
}

#[actix_web::test]
async fn test_concurrent_generate_is_rejected() {
    let backend = ScriptedBackend::new();
    backend.reply(CallKind::LessonContent, content_reply(2));
    backend.delay(CallKind::LessonContent, Duration::from_millis(100));
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    let req = test::TestRequest::post()
        .uri("/api/form/merge")
        .set_json(json!({ "material": MATERIAL, "cp": "CP", "tp": "1. TP" }))
        .to_request();
    test::call_service(&app, req).await;

    let first = test::TestRequest::post().uri("/api/form/generate").to_request();
    let second = test::TestRequest::post().uri("/api/form/generate").to_request();
    let (first, second) = tokio::join!(
        test::call_service(&app, first),
        test::call_service(&app, second)
    );

    let mut statuses = vec![first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);
    assert_eq!(backend.calls(CallKind::LessonContent).len(), 1);
}

#[actix_web::test]
async fn test_generation_failure_keeps_previous_content() {
    let backend = ScriptedBackend::new();
    backend.reply(CallKind::LessonContent, content_reply(3));
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    let req = test::TestRequest::post()
        .uri("/api/form/merge")
        .set_json(json!({ "material": MATERIAL, "cp": "CP", "tp": "1. TP", "meetingCount": 2 }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post().uri("/api/form/generate").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Gagal menghasilkan konten RPM.");

    let snapshot = state.form.snapshot();
    assert!(!snapshot.is_generating);
    assert!(snapshot.generated_content.is_none());
    assert_eq!(snapshot.error.as_deref(), Some("Gagal menghasilkan konten RPM."));
}

#[actix_web::test]
async fn test_image_failure_falls_back_to_placeholder() {
    let backend = ScriptedBackend::new();
    backend.reply(CallKind::LessonContent, content_reply(1));
    backend.fail(CallKind::Image, 429);
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    let req = test::TestRequest::post()
        .uri("/api/form/merge")
        .set_json(json!({ "material": MATERIAL, "cp": "CP", "tp": "1. TP", "meetingCount": 1 }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post().uri("/api/form/generate").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["generatedImageUrl"],
        "https://placeholder.test/seed/Luas%20dan%20Keliling%20Bangun%20Datar/800/450"
    );

    // A manual refresh that fails leaves no image rather than a placeholder
    let req = test::TestRequest::post().uri("/api/form/illustration").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["generatedImageUrl"].is_null());
}

#[actix_web::test]
async fn test_field_and_tag_errors() {
    let backend = ScriptedBackend::new();
    let state = test_state(backend, Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    let resp = test::call_service(&app, set_field("favouriteColour", "biru").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(&app, set_field("meetingCount", "-3").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["formData"]["meetingCount"], 1);

    let toggle = |label: &str| {
        test::TestRequest::post()
            .uri("/api/form/tags")
            .set_json(json!({ "kind": "pedagogy", "label": label }))
            .to_request()
    };

    let resp = test::call_service(&app, toggle("Inquiry Learning")).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["formData"]["pedagogy"], json!(["Inquiry Learning"]));

    let resp = test::call_service(&app, toggle("Inquiry Learning")).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["formData"]["pedagogy"], json!([]));

    let resp = test::call_service(&app, toggle("Belajar Sambil Bermain")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_topics_are_cached() {
    let backend = ScriptedBackend::new();
    backend.reply(
        CallKind::Topics,
        json!([{ "chapter": "Bab 1", "title": "Bangun Datar", "materials": [MATERIAL] }]),
    );
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/api/topics?subject=Matematika&grade=Kelas%204")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body[0]["materials"][0], MATERIAL);
    }

    assert_eq!(backend.calls(CallKind::Topics).len(), 1);
    assert!(!state.form.snapshot().is_fetching_topics);
}

#[actix_web::test]
async fn test_topic_failure_returns_empty_list() {
    let backend = ScriptedBackend::new();
    backend.fail(CallKind::Topics, 503);
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    for _ in 0..2 {
        let req = test::TestRequest::get().uri("/api/topics").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!([]));
    }

    // Empty results are not cached
    assert_eq!(backend.calls(CallKind::Topics).len(), 2);
}

#[actix_web::test]
async fn test_options_list_fixed_choices() {
    let backend = ScriptedBackend::new();
    let state = test_state(backend, Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    let req = test::TestRequest::get().uri("/api/options").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["grades"], json!(["Kelas 4", "Kelas 5", "Kelas 6"]));
    assert_eq!(body["pedagogy"].as_array().unwrap().len(), 8);
    assert_eq!(body["semesterMonths"]["odd"][0]["code"], "Jul");
    assert_eq!(body["semesterMonths"]["even"][5]["name"], "Juni");
}

#[actix_web::test]
async fn test_abandoned_generate_still_commits() {
    let backend = ScriptedBackend::new();
    backend.reply(CallKind::LessonContent, content_reply(2));
    backend.delay(CallKind::LessonContent, Duration::from_millis(300));
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    let req = test::TestRequest::post()
        .uri("/api/form/merge")
        .set_json(json!({ "material": MATERIAL, "cp": "CP", "tp": "1. TP" }))
        .to_request();
    test::call_service(&app, req).await;

    // Client gives up long before the AI answers
    let req = test::TestRequest::post().uri("/api/form/generate").to_request();
    let abandoned =
        tokio::time::timeout(Duration::from_millis(50), test::call_service(&app, req)).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(500)).await;
    let snapshot = state.form.snapshot();
    assert!(!snapshot.is_generating);
    assert_eq!(snapshot.generated_content.as_ref().unwrap().meetings.len(), 2);

    let req = test::TestRequest::post().uri("/api/form/generate").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_blank_meeting_steps_are_rejected() {
    let mut reply = content_reply(2);
    reply["meetings"][0]["opening"]["steps"] = json!("");
    reply["meetings"][1]["apply"]["steps"] = json!("   ");
    let backend = ScriptedBackend::new();
    backend.reply(CallKind::LessonContent, reply);
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    let req = test::TestRequest::post()
        .uri("/api/form/merge")
        .set_json(json!({ "material": MATERIAL, "cp": "CP", "tp": "1. TP", "meetingCount": 2 }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post().uri("/api/form/generate").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let snapshot = state.form.snapshot();
    assert!(snapshot.generated_content.is_none());
    assert_eq!(snapshot.error.as_deref(), Some("Gagal menghasilkan konten RPM."));
}

#[actix_web::test]
async fn test_overlapping_topic_fetches_keep_flag() {
    let backend = ScriptedBackend::new();
    backend.reply(
        CallKind::Topics,
        json!([{ "chapter": "Bab 1", "title": "Bangun Datar", "materials": [MATERIAL] }]),
    );
    backend.delay(CallKind::Topics, Duration::from_millis(200));
    let state = test_state(backend.clone(), Arc::new(MemoryBlobStorage::new())).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api_config)).await;

    let first = test::TestRequest::get().uri("/api/topics?search=luas").to_request();
    let second = test::TestRequest::get().uri("/api/topics?search=keliling").to_request();
    let (_, _, midway) = tokio::join!(
        test::call_service(&app, first),
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            test::call_service(&app, second).await
        },
        async {
            // First fetch done, second still running
            tokio::time::sleep(Duration::from_millis(250)).await;
            state.form.snapshot().is_fetching_topics
        }
    );

    assert!(midway);
    assert!(!state.form.snapshot().is_fetching_topics);
    assert_eq!(backend.calls(CallKind::Topics).len(), 2);
}
