//! Maps raw provider output and transport failures onto [`OperationResult`].
//!
//! This is the only place that knows how the upstream provider signals
//! blocks, stops and quota problems. Both client modes funnel through it.

use crate::error::{EditError, ErrorKind, OperationResult, TransportError};
use crate::models::gemini::{upstream_error_text, GenerateContentResponse, Part};
use crate::models::ContentPart;

pub const QUOTA_MESSAGE: &str =
    "You have exceeded your current quota. Please check your plan and billing details.";
pub const INVALID_CREDENTIAL_MESSAGE: &str =
    "The API key is invalid. Please check the configured credential.";
pub const NO_RESPONSE_MESSAGE: &str =
    "The model returned no response. Safety filters may have blocked the output.";
pub const UNSAFE_STOP_MESSAGE: &str =
    "The model stopped generating because the output was flagged as unsafe.";
pub const EMPTY_CONTENT_MESSAGE: &str =
    "The AI did not return any usable content. Try adjusting your prompt.";

const NORMAL_STOPS: &[&str] = &["STOP", "MAX_TOKENS"];
const SAFETY_STOPS: &[&str] = &[
    "SAFETY",
    "IMAGE_SAFETY",
    "PROHIBITED_CONTENT",
    "IMAGE_PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
];

/// Single pass over the first candidate; see the module docs for the policy.
pub fn normalize(response: &GenerateContentResponse) -> OperationResult {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
    {
        return Err(EditError::safety_blocked(format!(
            "Request was blocked due to {}.",
            reason
        )));
    }

    let candidate = response
        .first_candidate()
        .ok_or_else(|| EditError::new(ErrorKind::NoResponse, NO_RESPONSE_MESSAGE))?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if SAFETY_STOPS.contains(&reason) {
            return Err(EditError::safety_blocked(UNSAFE_STOP_MESSAGE));
        }
        if !NORMAL_STOPS.contains(&reason) {
            return Err(EditError::new(
                ErrorKind::AbnormalStop,
                format!("Image generation stopped unexpectedly. Reason: {}", reason),
            ));
        }
    }

    let parts: Vec<ContentPart> = candidate
        .content
        .iter()
        .flat_map(|content| content.parts.iter())
        .filter_map(to_content_part)
        .collect();

    if parts.is_empty() {
        return Err(EditError::new(ErrorKind::EmptyContent, EMPTY_CONTENT_MESSAGE));
    }

    Ok(parts)
}

fn to_content_part(part: &Part) -> Option<ContentPart> {
    if let Some(text) = part.text.as_deref().filter(|t| !t.is_empty()) {
        return Some(ContentPart::text(text));
    }
    part.inline_data
        .as_ref()
        .filter(|inline| !inline.data.is_empty())
        .map(|inline| ContentPart::image(&inline.mime_type, &inline.data))
}

/// Translates an error status and/or error text into a user-facing failure.
///
/// Order matters: quota, credential, misconfiguration, safety, bad input,
/// other HTTP failures, then the generic wrapper.
pub fn translate_error(status: Option<u16>, text: &str) -> EditError {
    let lower = text.to_lowercase();

    if status == Some(429) || text.contains("RESOURCE_EXHAUSTED") || lower.contains("quota") {
        return EditError::new(ErrorKind::QuotaExceeded, QUOTA_MESSAGE);
    }
    if text.contains("API_KEY_INVALID") || lower.contains("api key not valid") {
        return EditError::new(ErrorKind::InvalidCredential, INVALID_CREDENTIAL_MESSAGE);
    }
    if lower.contains("misconfigured") {
        return EditError::server_misconfigured(text);
    }
    if text.contains("SAFETY") {
        return EditError::safety_blocked(format!("The request was blocked by safety filters: {}", text));
    }
    match status {
        Some(400) if text.starts_with("Missing") => EditError::invalid_input(text),
        Some(code) if !(200..300).contains(&code) => EditError::network(if text.is_empty() {
            format!("Request failed with status {}", code)
        } else {
            format!("Request failed with status {}: {}", code, text)
        }),
        _ => EditError::generic(format!("Failed to generate edit: {}", text)),
    }
}

/// Direct-mode and relay-mode transport failures end up here.
pub fn translate_transport_error(error: &TransportError) -> EditError {
    match error {
        TransportError::Status { status, body } => {
            translate_error(Some(*status), &upstream_error_text(body))
        }
        TransportError::Request(e) if e.is_timeout() => {
            EditError::network(format!("The request timed out: {}", e))
        }
        TransportError::Request(e) => EditError::network(format!("Network error: {}", e)),
        TransportError::Decode(message) => translate_error(None, message),
    }
}
