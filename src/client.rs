use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::{ClientConfig, ClientMode},
    error::{EditError, OperationResult, Result, TransportError},
    gemini::GeminiClient,
    models::{
        gemini::GenerateContentResponse, EditRequest, ImageAsset, RelayEditRequest,
        RelayEditResponse, RelayErrorBody,
    },
    normalize,
};

/// Fetches the raw provider response for one edit.
#[async_trait]
pub trait EditTransport: Send + Sync {
    async fn fetch(
        &self,
        request: &EditRequest,
    ) -> std::result::Result<GenerateContentResponse, TransportError>;

    fn mode(&self) -> ClientMode;
}

#[async_trait]
impl EditTransport for GeminiClient {
    async fn fetch(
        &self,
        request: &EditRequest,
    ) -> std::result::Result<GenerateContentResponse, TransportError> {
        self.generate_content(request).await
    }

    fn mode(&self) -> ClientMode {
        ClientMode::Direct
    }
}

/// Talks to the relay's `POST /api/edit`.
#[derive(Debug, Clone)]
pub struct RelayTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl RelayTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.gemini.timeout)
            .build()
            .map_err(|e| EditError::generic(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/edit", config.relay_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EditTransport for RelayTransport {
    async fn fetch(
        &self,
        request: &EditRequest,
    ) -> std::result::Result<GenerateContentResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RelayEditRequest::from(request))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Prefer the relay's `{ error }` message; fall back to the raw body.
            let body = serde_json::from_str::<RelayErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let relayed: RelayEditResponse =
            serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(relayed.into_provider())
    }

    fn mode(&self) -> ClientMode {
        ClientMode::Proxied
    }
}

/// Submits edits and turns whatever comes back into an [`OperationResult`].
///
/// Callers should keep at most one submission in flight per session.
#[derive(Clone)]
pub struct EditClient {
    transport: Arc<dyn EditTransport>,
}

impl EditClient {
    pub fn new(transport: Arc<dyn EditTransport>) -> Self {
        Self { transport }
    }

    /// Builds the transport for the configured mode. Direct mode needs a credential.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport: Arc<dyn EditTransport> = match config.mode {
            ClientMode::Direct => {
                log::warn!("Direct mode holds the API key client-side; use it for local development only");
                Arc::new(GeminiClient::new(&config.gemini)?)
            }
            ClientMode::Proxied => Arc::new(RelayTransport::new(config)?),
        };
        Ok(Self::new(transport))
    }

    pub fn mode(&self) -> ClientMode {
        self.transport.mode()
    }

    pub async fn submit(&self, image: Option<&ImageAsset>, prompt: &str) -> OperationResult {
        let request = EditRequest::new(image, prompt)?;
        self.submit_request(&request).await
    }

    pub async fn submit_request(&self, request: &EditRequest) -> OperationResult {
        match self.transport.fetch(request).await {
            Ok(raw) => {
                let result = normalize::normalize(&raw);
                match &result {
                    Ok(parts) => log::info!("Edit produced {} content part(s)", parts.len()),
                    Err(e) => log::warn!("Edit rejected ({}): {}", e.kind(), e),
                }
                result
            }
            Err(e) => {
                let error = normalize::translate_transport_error(&e);
                log::error!("Edit failed ({}): {}", error.kind(), e);
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for EditClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditClient")
            .field("mode", &self.mode())
            .finish()
    }
}
