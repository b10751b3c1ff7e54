use std::fmt;

use crate::models::ContentPart;

/// The failure classes a user can see after submitting an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    Network,
    SafetyBlocked,
    NoResponse,
    AbnormalStop,
    EmptyContent,
    QuotaExceeded,
    InvalidCredential,
    ServerMisconfigured,
    Generic,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Network => "network",
            ErrorKind::SafetyBlocked => "safety_blocked",
            ErrorKind::NoResponse => "no_response",
            ErrorKind::AbnormalStop => "abnormal_stop",
            ErrorKind::EmptyContent => "empty_content",
            ErrorKind::QuotaExceeded => "quota_exceeded",
            ErrorKind::InvalidCredential => "invalid_credential",
            ErrorKind::ServerMisconfigured => "server_misconfigured",
            ErrorKind::Generic => "generic",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal, user-facing failure for one edit request.
///
/// `Display` prints only the message, which is what the UI shows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EditError {
    kind: ErrorKind,
    message: String,
}

impl EditError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn safety_blocked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SafetyBlocked, message)
    }

    pub fn server_misconfigured(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServerMisconfigured, message)
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generic, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What can go wrong in a single HTTP exchange with the provider or the relay.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A success response whose body could not be read as expected.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Request(e) => e.status().map(|s| s.as_u16()),
            TransportError::Decode(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EditError>;

/// Either a non-empty ordered list of content parts or a typed failure.
pub type OperationResult = Result<Vec<ContentPart>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_message_only() {
        let err = EditError::new(ErrorKind::QuotaExceeded, "over quota");
        assert_eq!(err.to_string(), "over quota");
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
    }

    #[test]
    fn test_transport_status() {
        let err = TransportError::Status {
            status: 429,
            body: "slow down".into(),
        };
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.to_string(), "HTTP 429: slow down");
        assert_eq!(TransportError::Decode("bad".into()).status(), None);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::SafetyBlocked.to_string(), "safety_blocked");
        assert_eq!(ErrorKind::ServerMisconfigured.as_str(), "server_misconfigured");
    }
}
