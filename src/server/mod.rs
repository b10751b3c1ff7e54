//! The relay: holds the provider credential so browsers never see it.
//!
//! It validates input, forwards one edit upstream and returns the raw parts.
//! Normalization is left to the client.

use std::net::SocketAddr;

use actix_web::{
    dev::Server,
    error::{InternalError, JsonPayloadError},
    http::StatusCode,
    middleware, web, App, HttpRequest, HttpResponse, HttpServer,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    config::{GeminiConfig, RelayConfig},
    error::TransportError,
    gemini::GeminiClient,
    logger,
    models::{
        gemini::upstream_error_text, EditRequest, ImageFormat, RelayEditRequest,
        RelayEditResponse, RelayErrorBody,
    },
};

pub const MISSING_INPUT_MESSAGE: &str = "Missing base64 image data or prompt";
pub const MISCONFIGURED_MESSAGE: &str = "Server misconfigured: API key not set";

pub struct AppState {
    gemini: Option<GeminiClient>,
}

impl AppState {
    pub fn new(config: &GeminiConfig) -> Self {
        let gemini = match GeminiClient::new(config) {
            Ok(client) => Some(client),
            Err(e) => {
                log::warn!("Relay has no upstream client: {}", e);
                None
            }
        };
        Self { gemini }
    }

    pub fn credential_configured(&self) -> bool {
        self.gemini.is_some()
    }
}

/// JSON extractor settings: size limit plus `{ error }` bodies on rejection.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            let status = match &err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    StatusCode::PAYLOAD_TOO_LARGE
                }
                _ => StatusCode::BAD_REQUEST,
            };
            log::warn!("Rejected request body: {}", err);
            let response = HttpResponse::build(status).json(RelayErrorBody::new(err.to_string()));
            InternalError::from_response(err, response).into()
        })
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/edit", web::post().to(edit_image))
        .route("/api/health", web::get().to(health));
}

async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "credentialConfigured": state.credential_configured(),
    }))
}

async fn edit_image(
    state: web::Data<AppState>,
    body: web::Json<RelayEditRequest>,
) -> HttpResponse {
    let request_id = Uuid::new_v4().to_string();
    let body = body.into_inner();

    if body.base64.is_empty() || body.prompt.trim().is_empty() {
        log::warn!("Rejected edit with missing input [req:{}]", request_id);
        return HttpResponse::BadRequest().json(RelayErrorBody::new(MISSING_INPUT_MESSAGE));
    }

    let gemini = match &state.gemini {
        Some(gemini) => gemini,
        None => {
            log::error!("Edit refused, no API key configured [req:{}]", request_id);
            return HttpResponse::InternalServerError()
                .json(RelayErrorBody::new(MISCONFIGURED_MESSAGE));
        }
    };

    let mime_type = if body.mime_type.trim().is_empty() {
        ImageFormat::from_base64_prefix(&body.base64)
            .unwrap_or(ImageFormat::Png)
            .mime_type()
            .to_string()
    } else {
        body.mime_type
    };

    let request = EditRequest {
        base64: body.base64,
        mime_type,
        prompt: body.prompt,
    };

    log::info!(
        "Relaying edit to {} ({}) [req:{}]",
        gemini.model(),
        request.mime_type,
        request_id
    );
    let outcome = {
        let _timer = logger::timer(&format!("upstream edit [req:{}]", request_id));
        gemini.generate_content(&request).await
    };

    match outcome {
        Ok(response) => HttpResponse::Ok().json(RelayEditResponse::from_provider(response)),
        Err(TransportError::Status { status, body }) => {
            let status = StatusCode::from_u16(status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            log::error!("Upstream error {} [req:{}]", status.as_u16(), request_id);
            HttpResponse::build(status).json(RelayErrorBody::new(upstream_error_text(&body)))
        }
        Err(e) => {
            log::error!("Upstream unreachable: {} [req:{}]", e, request_id);
            HttpResponse::BadGateway().json(RelayErrorBody::new(e.to_string()))
        }
    }
}

/// Binds the relay and returns the server future with the bound addresses.
pub fn build_server(config: &RelayConfig) -> std::io::Result<(Server, Vec<SocketAddr>)> {
    let state = web::Data::new(AppState::new(&config.gemini));
    if !state.credential_configured() {
        log::warn!("API key is not set. Edit requests will fail until GEMINI_API_KEY is provided.");
    }

    let limit = config.body_limit_bytes;
    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::new("%r %s %Dms"))
            .app_data(state.clone())
            .app_data(json_config(limit))
            .configure(routes)
    })
    .bind((config.host.as_str(), config.port))?;

    let addrs = server.addrs();
    Ok((server.run(), addrs))
}

pub async fn run(config: RelayConfig) -> std::io::Result<()> {
    let (server, addrs) = build_server(&config)?;
    for addr in &addrs {
        log::info!("DripEditz relay listening on http://{}", addr);
    }
    server.await
}
