use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};
use crate::models::ImageAsset;

/// One unit of generated output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image(mime_type: &str, data: &str) -> Self {
        ContentPart::Image {
            image_url: format!("data:{};base64,{}", mime_type, data),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            ContentPart::Image { .. } => None,
        }
    }

    pub fn as_image_url(&self) -> Option<&str> {
        match self {
            ContentPart::Image { image_url } => Some(image_url),
            ContentPart::Text { .. } => None,
        }
    }
}

/// A validated edit submission. Built fresh per submission and never mutated.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub base64: String,
    pub mime_type: String,
    pub prompt: String,
}

impl EditRequest {
    /// Rejects a missing image or a blank prompt before anything touches the network.
    pub fn new(image: Option<&ImageAsset>, prompt: &str) -> Result<Self> {
        let image = image.ok_or_else(missing_input)?;
        if prompt.trim().is_empty() || image.base64().is_empty() {
            return Err(missing_input());
        }

        Ok(Self {
            base64: image.base64().to_string(),
            mime_type: image.mime_type().to_string(),
            prompt: prompt.to_string(),
        })
    }
}

fn missing_input() -> EditError {
    EditError::invalid_input("Please upload an image and provide an edit description.")
}
