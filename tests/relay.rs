mod common;

use actix_web::{test, web, App};
use base64::{engine::general_purpose::STANDARD, Engine};
use dripeditz::server::{json_config, routes, AppState, MISCONFIGURED_MESSAGE, MISSING_INPUT_MESSAGE};
use dripeditz::GeminiConfig;
use serde_json::{json, Value};

use common::{spawn_upstream, JPEG_BYTES};

macro_rules! relay_app {
    ($gemini:expr, $limit:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(&$gemini)))
                .app_data(json_config($limit))
                .configure(routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_missing_prompt_is_rejected() {
    let app = relay_app!(GeminiConfig::new().with_api_key("k"), 1024 * 1024);

    let req = test::TestRequest::post()
        .uri("/api/edit")
        .set_json(json!({"base64": "AAAA", "mimeType": "image/png"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], MISSING_INPUT_MESSAGE);
}

#[actix_web::test]
async fn test_missing_credential_is_500() {
    let upstream = spawn_upstream();
    let app = relay_app!(
        GeminiConfig::new().with_base_url(&upstream.base_url),
        1024 * 1024
    );

    let req = test::TestRequest::post()
        .uri("/api/edit")
        .set_json(json!({"base64": "AAAA", "mimeType": "image/png", "prompt": "add a hat"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], MISCONFIGURED_MESSAGE);
    assert_eq!(upstream.hits(), 0);
}

#[actix_web::test]
async fn test_relays_raw_parts() {
    let upstream = spawn_upstream();
    let app = relay_app!(upstream.config(), 1024 * 1024);

    let req = test::TestRequest::post()
        .uri("/api/edit")
        .set_json(json!({
            "base64": STANDARD.encode(JPEG_BYTES),
            "mimeType": "image/jpeg",
            "prompt": "add a hat"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["parts"][0]["text"], "Edited a image/jpeg image.");
    assert_eq!(body["parts"][1]["inlineData"]["mimeType"], "image/png");
    assert_eq!(body["finishReason"], "STOP");
    // Raw parts only; the relay never builds data URLs.
    assert!(body["parts"][1].get("imageUrl").is_none());
    assert_eq!(upstream.hits(), 1);
}

#[actix_web::test]
async fn test_missing_mime_type_is_sniffed() {
    let upstream = spawn_upstream();
    let app = relay_app!(upstream.config(), 1024 * 1024);

    let req = test::TestRequest::post()
        .uri("/api/edit")
        .set_json(json!({"base64": STANDARD.encode(JPEG_BYTES), "prompt": "add a hat"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["parts"][0]["text"], "Edited a image/jpeg image.");
}

#[actix_web::test]
async fn test_upstream_status_is_passed_through() {
    let upstream = spawn_upstream();
    let app = relay_app!(upstream.config(), 1024 * 1024);

    let req = test::TestRequest::post()
        .uri("/api/edit")
        .set_json(json!({"base64": "AAAA", "mimeType": "image/png", "prompt": "use up quota"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 429);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("RESOURCE_EXHAUSTED"));
}

#[actix_web::test]
async fn test_oversize_body_gets_json_error() {
    let app = relay_app!(GeminiConfig::new().with_api_key("k"), 64);

    let req = test::TestRequest::post()
        .uri("/api/edit")
        .set_json(json!({"base64": "A".repeat(1024), "mimeType": "image/png", "prompt": "x"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 413);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_health_reports_credential() {
    let app = relay_app!(GeminiConfig::new(), 1024);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["credentialConfigured"], false);
}
