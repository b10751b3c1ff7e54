use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD, Engine};
use uuid::Uuid;

use crate::error::{EditError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// The file-picker filter advertised to users. Other types are accepted but not validated.
    pub const ACCEPT: &'static str = "image/png, image/jpeg, image/webp";

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }
        None
    }

    /// Sniffs the format from the first bytes of a base64 payload.
    pub fn from_base64_prefix(payload: &str) -> Option<Self> {
        // 16 base64 chars decode to 12 bytes, enough for every signature above.
        let prefix: String = payload.chars().take(16).collect();
        let bytes = STANDARD.decode(prefix.as_bytes()).ok()?;
        Self::from_magic_bytes(&bytes)
    }
}

/// Tracks preview handles that are still alive.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<String>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&self) -> PreviewHandle {
        let url = format!("blob:{}", Uuid::new_v4());
        if let Ok(mut live) = self.live.lock() {
            live.insert(url.clone());
        }
        PreviewHandle {
            inner: Arc::new(HandleInner {
                url,
                registry: self.clone(),
            }),
        }
    }

    fn release(&self, url: &str) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(url);
            log::trace!("Released preview handle {}", url);
        }
    }

    pub fn live(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.live
            .lock()
            .map(|live| live.contains(url))
            .unwrap_or(false)
    }
}

#[derive(Debug)]
struct HandleInner {
    url: String,
    registry: PreviewRegistry,
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        self.registry.release(&self.url);
    }
}

/// Opaque, locally valid handle for previewing an asset.
/// Released when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    inner: Arc<HandleInner>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.inner.url
    }
}

/// A user-selected image ready to be sent: base64 payload without the
/// data-URL prefix, its MIME type, and a preview handle.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    base64: String,
    mime_type: String,
    preview: PreviewHandle,
}

impl ImageAsset {
    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// Turns files, raw bytes or data URLs into [`ImageAsset`]s.
#[derive(Debug, Clone, Default)]
pub struct ImageEncoder {
    previews: PreviewRegistry,
}

impl ImageEncoder {
    pub fn new(previews: PreviewRegistry) -> Self {
        Self { previews }
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Splits `data:<mime>;base64,<payload>` into its MIME type and payload.
    pub fn encode_data_url(&self, data_url: &str) -> Result<ImageAsset> {
        let (header, payload) = data_url
            .split_once(',')
            .ok_or_else(|| EditError::invalid_input("Image data is not a valid data URL."))?;
        let mime_type = header
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .filter(|mime| !mime.is_empty())
            .ok_or_else(|| EditError::invalid_input("Image data URL has no MIME type."))?;

        if payload.is_empty() {
            return Err(EditError::invalid_input("Image data URL has no payload."));
        }

        if ImageFormat::from_mime_type(mime_type).is_none() {
            log::debug!("Accepting unadvertised image type {}", mime_type);
        }

        Ok(self.build(payload.to_string(), mime_type.to_string()))
    }

    pub fn encode_bytes(&self, bytes: &[u8], mime_type: &str) -> ImageAsset {
        self.build(STANDARD.encode(bytes), mime_type.to_string())
    }

    /// Reads an image file. `None` means nothing was selected and yields no asset.
    pub fn encode_file(&self, path: Option<&Path>) -> Result<Option<ImageAsset>> {
        let path = match path {
            Some(path) => path,
            None => return Ok(None),
        };

        let bytes = std::fs::read(path).map_err(|e| {
            EditError::invalid_input(format!("Could not read {}: {}", path.display(), e))
        })?;

        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .or_else(|| ImageFormat::from_magic_bytes(&bytes))
            .map(|format| format.mime_type())
            .unwrap_or("application/octet-stream");

        Ok(Some(self.encode_bytes(&bytes, mime_type)))
    }

    fn build(&self, base64: String, mime_type: String) -> ImageAsset {
        ImageAsset {
            base64,
            mime_type,
            preview: self.previews.allocate(),
        }
    }
}
