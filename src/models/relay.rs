use serde::{Deserialize, Serialize};

use crate::models::gemini::{Candidate, Content, GenerateContentResponse, Part, PromptFeedback};
use crate::models::EditRequest;

/// Body of `POST /api/edit`. Missing fields deserialize as empty so the relay
/// can answer with its own 400 instead of a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayEditRequest {
    #[serde(default)]
    pub base64: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub prompt: String,
}

impl From<&EditRequest> for RelayEditRequest {
    fn from(request: &EditRequest) -> Self {
        Self {
            base64: request.base64.clone(),
            mime_type: request.mime_type.clone(),
            prompt: request.prompt.clone(),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Success body of `POST /api/edit`: the first candidate's raw parts plus the
/// signals the normalizer needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayEditResponse {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub no_candidate: bool,
}

impl RelayEditResponse {
    pub fn from_provider(response: GenerateContentResponse) -> Self {
        let prompt_feedback = response.prompt_feedback;
        match response.candidates.into_iter().next() {
            Some(candidate) => Self {
                parts: candidate.content.map(|c| c.parts).unwrap_or_default(),
                finish_reason: candidate.finish_reason,
                prompt_feedback,
                no_candidate: false,
            },
            None => Self {
                prompt_feedback,
                no_candidate: true,
                ..Default::default()
            },
        }
    }

    /// Rebuilds a provider-shaped response so the same normalizer handles both modes.
    pub fn into_provider(self) -> GenerateContentResponse {
        let candidates = if self.no_candidate {
            Vec::new()
        } else {
            vec![Candidate {
                content: Some(Content {
                    parts: self.parts,
                    role: Some("model".to_string()),
                }),
                finish_reason: self.finish_reason,
                ..Default::default()
            }]
        };

        GenerateContentResponse {
            candidates,
            prompt_feedback: self.prompt_feedback,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayErrorBody {
    pub error: String,
}

impl RelayErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let request: RelayEditRequest = serde_json::from_str(r#"{"prompt": "x"}"#).unwrap();
        assert!(request.base64.is_empty());
        assert!(request.mime_type.is_empty());
    }

    #[test]
    fn test_provider_round_trip_keeps_signals() {
        let provider: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "hi"}]}, "finishReason": "SAFETY"}]}"#,
        )
        .unwrap();

        let relayed = RelayEditResponse::from_provider(provider);
        let json = serde_json::to_value(&relayed).unwrap();
        assert_eq!(json["parts"][0]["text"], "hi");
        assert_eq!(json["finishReason"], "SAFETY");
        assert!(json.get("noCandidate").is_none());

        let rebuilt = relayed.into_provider();
        let candidate = rebuilt.first_candidate().unwrap();
        assert_eq!(candidate.finish_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_no_candidate_is_preserved() {
        let relayed = RelayEditResponse::from_provider(GenerateContentResponse::default());
        let json = serde_json::to_string(&relayed).unwrap();
        let parsed: RelayEditResponse = serde_json::from_str(&json).unwrap();
        assert!(parsed.into_provider().candidates.is_empty());
    }

    #[test]
    fn test_bare_parts_body_is_a_candidate() {
        let parsed: RelayEditResponse =
            serde_json::from_str(r#"{"parts": [{"text": "only parts"}]}"#).unwrap();
        let rebuilt = parsed.into_provider();
        assert_eq!(rebuilt.candidates.len(), 1);
    }
}
