#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use dripeditz::{GeminiConfig, RelayConfig};
use serde_json::{json, Value};

pub const TEST_KEY: &str = "test-key";

/// 12 bytes starting with the JPEG signature.
pub const JPEG_BYTES: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0, 1];

/// Stands in for the generation API. The prompt picks the canned reply.
pub struct FakeUpstream {
    pub base_url: String,
    hits: web::Data<AtomicUsize>,
}

impl FakeUpstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> GeminiConfig {
        GeminiConfig::new()
            .with_api_key(TEST_KEY)
            .with_base_url(&self.base_url)
    }
}

async fn generate_content(
    req: HttpRequest,
    body: web::Json<Value>,
    hits: web::Data<AtomicUsize>,
) -> HttpResponse {
    hits.fetch_add(1, Ordering::SeqCst);

    let key = req
        .headers()
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if key != TEST_KEY {
        return HttpResponse::BadRequest().json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{"reason": "API_KEY_INVALID"}]
            }
        }));
    }

    let parts = &body["contents"][0]["parts"];
    let mime = parts[0]["inlineData"]["mimeType"].as_str().unwrap_or_default();
    let prompt = parts[1]["text"].as_str().unwrap_or_default();

    match prompt {
        "use up quota" => HttpResponse::TooManyRequests().json(json!({
            "error": {
                "code": 429,
                "message": "You exceeded your current quota, please check your plan and billing details.",
                "status": "RESOURCE_EXHAUSTED"
            }
        })),
        "something unsafe" => HttpResponse::Ok().json(json!({
            "candidates": [{
                "content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}]},
                "finishReason": "SAFETY"
            }]
        })),
        "blocked prompt" => HttpResponse::Ok().json(json!({
            "promptFeedback": {"blockReason": "PROHIBITED_CONTENT"}
        })),
        "say nothing" => HttpResponse::Ok().json(json!({
            "candidates": [{"content": {"parts": [{}]}, "finishReason": "STOP"}]
        })),
        _ => HttpResponse::Ok().json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": format!("Edited a {} image.", mime)},
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                    ]
                },
                "finishReason": "STOP"
            }]
        })),
    }
}

pub fn spawn_upstream() -> FakeUpstream {
    let hits = web::Data::new(AtomicUsize::new(0));
    let data = hits.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/v1beta/models/{call}", web::post().to(generate_content))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind fake upstream");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    FakeUpstream {
        base_url: format!("http://{}/v1beta", addr),
        hits,
    }
}

/// Starts a real relay and returns its base URL.
pub fn spawn_relay(gemini: GeminiConfig) -> String {
    let config = RelayConfig::new()
        .with_host("127.0.0.1")
        .with_port(0)
        .with_gemini(gemini);
    let (server, addrs) = dripeditz::server::build_server(&config).expect("bind relay");
    actix_web::rt::spawn(server);
    format!("http://{}", addrs[0])
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    listener.local_addr().expect("probe addr").port()
}
