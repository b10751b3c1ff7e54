//! Headless state for one editing session: what the UI shows and whether it
//! may submit. Each action replaces state wholesale; nothing is merged.

use std::time::{Duration, Instant};

use crate::client::EditClient;
use crate::models::{ContentPart, EditRequest, ImageAsset};

#[derive(Debug, Default)]
pub struct EditSession {
    image: Option<ImageAsset>,
    prompt: String,
    result: Vec<ContentPart>,
    error: Option<String>,
    busy: bool,
    cooldown: Duration,
    ready_at: Option<Instant>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Optional throttle applied after each submission.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Replaces the current image, dropping (and so releasing) the previous one.
    /// Any shown result or error belongs to the old image and is cleared.
    pub fn select_image(&mut self, image: Option<ImageAsset>) {
        self.image = image;
        self.result.clear();
        self.error = None;
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn image(&self) -> Option<&ImageAsset> {
        self.image.as_ref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn result(&self) -> &[ContentPart] {
        &self.result
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn remaining_cooldown(&self) -> Duration {
        self.ready_at
            .map(|at| at.saturating_duration_since(Instant::now()))
            .unwrap_or_default()
    }

    /// Whether the generate control should be enabled.
    pub fn can_generate(&self) -> bool {
        self.image.is_some()
            && !self.prompt.trim().is_empty()
            && !self.busy
            && self.remaining_cooldown().is_zero()
    }

    /// Runs one edit. Returns false when nothing was submitted.
    pub async fn generate(&mut self, client: &EditClient) -> bool {
        if self.busy || !self.remaining_cooldown().is_zero() {
            log::debug!("Generate ignored: busy or cooling down");
            return false;
        }

        let request = match EditRequest::new(self.image.as_ref(), &self.prompt) {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.to_string());
                return false;
            }
        };

        let busy = BusyGuard::new(&mut self.busy);
        self.error = None;
        self.result.clear();

        match client.submit_request(&request).await {
            Ok(parts) => self.result = parts,
            Err(e) => self.error = Some(e.to_string()),
        }

        drop(busy);
        if !self.cooldown.is_zero() {
            self.ready_at = Some(Instant::now() + self.cooldown);
        }
        true
    }
}

/// Holds the busy flag for the lifetime of one submission, including one
/// whose future is dropped before it completes.
struct BusyGuard<'a>(&'a mut bool);

impl<'a> BusyGuard<'a> {
    fn new(flag: &'a mut bool) -> Self {
        *flag = true;
        BusyGuard(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}
