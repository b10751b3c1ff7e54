use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BODY_LIMIT_MB: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Settings for talking to the upstream generation API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `GEMINI_API_KEY` (or the legacy `API_KEY`), `GEMINI_MODEL`,
    /// `GEMINI_BASE_URL` and `REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let api_key = resolve_api_key(env::var("GEMINI_API_KEY").ok(), env::var("API_KEY").ok());
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url =
            env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        GeminiConfig {
            api_key,
            model,
            base_url,
            timeout: Duration::from_secs(timeout),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The credential, if one is set and not blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }
}

/// Picks the first non-blank key, so an empty `GEMINI_API_KEY=` line
/// does not hide a usable legacy `API_KEY`.
fn resolve_api_key(primary: Option<String>, legacy: Option<String>) -> Option<String> {
    primary
        .filter(|key| !key.trim().is_empty())
        .or_else(|| legacy.filter(|key| !key.trim().is_empty()))
}

/// Settings for the relay process.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
    pub gemini: GeminiConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            body_limit_bytes: DEFAULT_BODY_LIMIT_MB * 1024 * 1024,
            gemini: GeminiConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let body_limit_mb = env::var("BODY_LIMIT_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_BODY_LIMIT_MB);

        RelayConfig {
            host,
            port,
            body_limit_bytes: body_limit_mb * 1024 * 1024,
            gemini: GeminiConfig::from_env(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit_bytes = bytes;
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }
}

/// Where the edit client sends its requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientMode {
    /// Call the upstream provider with a locally held credential. Local/dev use only.
    Direct,
    /// Call the same-origin relay, which holds the credential.
    #[default]
    Proxied,
}

impl ClientMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "direct" => Some(ClientMode::Direct),
            "proxied" | "proxy" | "relay" => Some(ClientMode::Proxied),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub mode: ClientMode,
    pub relay_url: String,
    pub gemini: GeminiConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            mode: ClientMode::Proxied,
            relay_url: DEFAULT_RELAY_URL.to_string(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `EDIT_MODE` and `RELAY_URL`; the Gemini settings are only used in direct mode.
    pub fn from_env() -> Self {
        let mode = match env::var("EDIT_MODE") {
            Ok(value) => ClientMode::parse(&value).unwrap_or_else(|| {
                log::warn!("Unknown EDIT_MODE '{}', using proxied", value);
                ClientMode::Proxied
            }),
            Err(_) => ClientMode::Proxied,
        };
        let relay_url = env::var("RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string());

        ClientConfig {
            mode,
            relay_url,
            gemini: GeminiConfig::from_env(),
        }
    }

    pub fn direct(gemini: GeminiConfig) -> Self {
        ClientConfig {
            mode: ClientMode::Direct,
            gemini,
            ..Default::default()
        }
    }

    pub fn proxied(relay_url: impl Into<String>) -> Self {
        ClientConfig {
            mode: ClientMode::Proxied,
            relay_url: relay_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.gemini.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_credential_counts_as_missing() {
        assert!(!GeminiConfig::new().has_credential());
        assert!(!GeminiConfig::new().with_api_key("   ").has_credential());
        assert_eq!(
            GeminiConfig::new().with_api_key(" key ").credential(),
            Some("key")
        );
    }

    #[test]
    fn test_blank_primary_key_falls_back_to_legacy() {
        assert_eq!(
            resolve_api_key(Some("".into()), Some("legacy-key".into())),
            Some("legacy-key".to_string())
        );
        assert_eq!(
            resolve_api_key(Some("  ".into()), Some("legacy-key".into())),
            Some("legacy-key".to_string())
        );
        assert_eq!(
            resolve_api_key(Some("primary".into()), Some("legacy-key".into())),
            Some("primary".to_string())
        );
        assert_eq!(resolve_api_key(Some(" ".into()), Some("".into())), None);
        assert_eq!(resolve_api_key(None, None), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = GeminiConfig::new().with_base_url("http://127.0.0.1:9000/v1beta/");
        assert_eq!(config.base_url, "http://127.0.0.1:9000/v1beta");
    }

    #[test]
    fn test_client_mode_parse() {
        assert_eq!(ClientMode::parse("Direct"), Some(ClientMode::Direct));
        assert_eq!(ClientMode::parse("proxied"), Some(ClientMode::Proxied));
        assert_eq!(ClientMode::parse("gateway"), None);
        assert_eq!(ClientMode::default(), ClientMode::Proxied);
    }

    #[test]
    fn test_relay_defaults() {
        let config = RelayConfig::new();
        assert_eq!(config.port, 3000);
        assert_eq!(config.body_limit_bytes, 50 * 1024 * 1024);
        assert_eq!(config.gemini.model, DEFAULT_MODEL);
    }
}
