//! DripEditz: upload an image, describe an edit, get back an edited image
//! and commentary from Gemini.
//!
//! [`client::EditClient`] talks either straight to the provider (direct mode,
//! development only) or to the relay in [`server`], which holds the API key.
//! Both modes hand raw provider output to [`normalize::normalize`].

pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod normalize;
#[cfg(feature = "server")]
pub mod server;
pub mod session;

pub use client::{EditClient, EditTransport, RelayTransport};
pub use config::{ClientConfig, ClientMode, GeminiConfig, RelayConfig};
pub use error::{EditError, ErrorKind, OperationResult, Result, TransportError};
pub use gemini::GeminiClient;
pub use models::{ContentPart, EditRequest, ImageAsset, ImageEncoder, ImageFormat, PreviewRegistry};
pub use normalize::{normalize, translate_error};
pub use session::EditSession;
