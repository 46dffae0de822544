mod common;

use std::sync::Arc;

use rpm_generator::suggestion::{
    GeminiBackend, GenerativeBackend, IllustrationFallback, SuggestionClient, SuggestionError,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{objectives_reply, test_config};

fn backend(server: &MockServer) -> GeminiBackend {
    let mut config = test_config();
    config.gemini.base_url = server.uri();
    GeminiBackend::new(reqwest::Client::new(), &config.gemini)
}

fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
}

#[tokio::test]
async fn test_json_call_shape_and_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-3-flash-preview:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(text_response(&objectives_reply().to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config();
    let client = SuggestionClient::new(
        Arc::new(backend(&server)),
        config.gemini.models.clone(),
        config.placeholder_image_base.clone(),
    );

    let suggestion = client
        .suggest_objectives("Matematika", "Luas dan Keliling Bangun Datar", "Kelas 4")
        .await
        .unwrap();
    assert_eq!(suggestion.tp.len(), 2);
    assert_eq!(suggestion.meeting_count(), Some(2));
}

#[tokio::test]
async fn test_error_status_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate_json("gemini-3-flash-preview", "prompt", &json!({ "type": "OBJECT" }))
        .await
        .unwrap_err();
    match err {
        SuggestionError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_text_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate_json("gemini-3-flash-preview", "prompt", &json!({ "type": "OBJECT" }))
        .await
        .unwrap_err();
    assert!(matches!(err, SuggestionError::EmptyResponse));
}

#[tokio::test]
async fn test_malformed_reply_fails_parse() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("{ \"cp\": ")))
        .mount(&server)
        .await;

    let config = test_config();
    let client = SuggestionClient::new(
        Arc::new(backend(&server)),
        config.gemini.models.clone(),
        config.placeholder_image_base.clone(),
    );
    let err = client
        .suggest_objectives("Matematika", "Pecahan", "Kelas 4")
        .await
        .unwrap_err();
    assert!(err.is_parse_failure());
}

#[tokio::test]
async fn test_image_call_returns_data_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash-image:generateContent"))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": "16:9" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here is your image" },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/4AAQ" } }
                ] }
            }]
        })))
        .mount(&server)
        .await;

    let config = test_config();
    let client = SuggestionClient::new(
        Arc::new(backend(&server)),
        config.gemini.models.clone(),
        config.placeholder_image_base.clone(),
    );
    let url = client
        .generate_illustration("Siklus Air", IllustrationFallback::Nothing)
        .await;
    assert_eq!(url.as_deref(), Some("data:image/jpeg;base64,/9j/4AAQ"));
}
