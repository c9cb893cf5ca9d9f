//! Mock Page for Testing
//!
//! Fixed selection; records every overlay frame and clipboard write.

use ctrlb::bridge::{Overlay, Page};
use ctrlb::CtrlResult;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub selection: String,
    pub frames: Arc<Mutex<Vec<Overlay>>>,
    pub clipboard: Arc<Mutex<Vec<String>>>,
}

impl MockPage {
    pub fn with_selection(text: &str) -> Self {
        Self {
            selection: text.to_string(),
            ..Self::default()
        }
    }

    /// Text of every rendered frame, in order
    pub fn texts(&self) -> Vec<String> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.text.clone())
            .collect()
    }
}

impl Page for MockPage {
    fn selected_text(&self) -> String {
        self.selection.clone()
    }

    fn render(&mut self, overlay: &Overlay) {
        self.frames.lock().unwrap().push(overlay.clone());
    }

    fn write_clipboard(&mut self, text: &str) -> CtrlResult<()> {
        self.clipboard.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
