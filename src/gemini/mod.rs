use crate::{
    config::GeminiConfig,
    error::{EditError, Result, TransportError},
    models::{gemini::GenerateContentRequest, gemini::GenerateContentResponse, EditRequest},
};

/// Issues the one upstream call an edit needs. Used by direct-mode clients and by the relay.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Fails with `ServerMisconfigured` when no usable credential is configured.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .credential()
            .ok_or_else(|| EditError::server_misconfigured("API key not set"))?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                EditError::server_misconfigured(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    pub async fn generate_content(
        &self,
        request: &EditRequest,
    ) -> std::result::Result<GenerateContentResponse, TransportError> {
        let body = GenerateContentRequest::for_edit(request);

        log::info!("Invoking model: {}", self.model);
        log::debug!(
            "Edit payload: {} base64 chars ({}), prompt {} chars",
            request.base64.len(),
            request.mime_type,
            request.prompt.chars().count()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Upstream request failed: {}", e);
                TransportError::Request(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = error_body(status, response.text().await);
            let text = self.redact(&text);
            log::error!("Upstream returned {}: {}", status.as_u16(), text);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            log::error!("Could not parse upstream response: {}", e);
            TransportError::Decode(e.to_string())
        })
    }

    fn redact(&self, text: &str) -> String {
        text.replace(&self.api_key, "[redacted]")
    }
}

/// The upstream error text, or the status reason when the body could not be read.
fn error_body<E: std::fmt::Display>(
    status: reqwest::StatusCode,
    read: std::result::Result<String, E>,
) -> String {
    match read {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Could not read upstream error body ({}): {}", status.as_u16(), e);
            status.canonical_reason().unwrap_or("unknown error").to_string()
        }
    }
}
