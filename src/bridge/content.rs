//! Content Bridge
//!
//! In-page handler for background requests. Owns the overlay state and
//! hands every change to the page for rendering.

use super::messages::{ContentReply, ContentRequest};
use crate::error::CtrlResult;
use tracing::debug;

/// Shown while a task is outstanding
pub const LOADING_TEXT: &str = "loading...";

/// Shown when the task failed
pub const FAILURE_TEXT: &str = "failed to perform LLM Task";

/// Page capabilities the bridge needs
pub trait Page: Send {
    /// Current text selection, empty when nothing is selected
    fn selected_text(&self) -> String;

    /// Draw the overlay
    fn render(&mut self, overlay: &Overlay);

    /// Put text on the clipboard
    fn write_clipboard(&mut self, text: &str) -> CtrlResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPhase {
    /// Hidden, or closed by the user
    #[default]
    Idle,
    /// Loading placeholder
    Awaiting,
    /// Streamed text, final result or failure message
    Displaying,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Overlay {
    pub phase: OverlayPhase,
    pub visible: bool,
    pub text: String,
}

pub struct ContentBridge {
    page: Box<dyn Page>,
    overlay: Overlay,
    /// Next chunk replaces the text instead of appending
    fresh: bool,
}

impl ContentBridge {
    pub fn new(page: Box<dyn Page>) -> Self {
        Self {
            page,
            overlay: Overlay::default(),
            fresh: true,
        }
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Handle one request from the background controller
    pub fn handle(&mut self, request: ContentRequest) -> ContentReply {
        debug!("📨 Content request: {}", request.kind());
        match request {
            ContentRequest::GrabSelectedText => {
                let text = self.page.selected_text();
                self.fresh = true;
                self.show(OverlayPhase::Awaiting, LOADING_TEXT.to_string());
                ContentReply::SelectedText { text }
            }
            ContentRequest::DisplayChunk { content } => {
                let mut text = if self.fresh {
                    String::new()
                } else {
                    std::mem::take(&mut self.overlay.text)
                };
                text.push_str(&content);
                self.fresh = false;
                self.show(OverlayPhase::Displaying, text);
                ack("content was displayed")
            }
            ContentRequest::DisplayResult { content } => {
                self.fresh = false;
                self.show(OverlayPhase::Displaying, content);
                ack("content was displayed")
            }
            ContentRequest::DisplayFailure => {
                self.fresh = false;
                self.show(OverlayPhase::Displaying, FAILURE_TEXT.to_string());
                ack("error message was displayed")
            }
        }
    }

    /// User closed the overlay
    pub fn close(&mut self) {
        self.overlay.phase = OverlayPhase::Idle;
        self.overlay.visible = false;
        self.page.render(&self.overlay);
    }

    /// User edited the overlay text
    pub fn edit(&mut self, text: &str) {
        self.overlay.text = text.to_string();
        self.page.render(&self.overlay);
    }

    /// User copied the overlay text
    pub fn copy(&mut self) -> CtrlResult<()> {
        self.page.write_clipboard(&self.overlay.text)
    }

    fn show(&mut self, phase: OverlayPhase, text: String) {
        self.overlay = Overlay {
            phase,
            visible: true,
            text,
        };
        self.page.render(&self.overlay);
    }
}

fn ack(message: &str) -> ContentReply {
    ContentReply::Ack {
        message: message.to_string(),
    }
}
