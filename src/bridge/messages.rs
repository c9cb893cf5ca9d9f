//! Bridge Message Types
//!
//! JSON-serializable messages for background ↔ content communication.

use serde::{Deserialize, Serialize};

/// Requests sent from the background controller to one tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ContentRequest {
    /// Read the page's current selection
    #[serde(rename = "grab-selected-text")]
    GrabSelectedText,

    /// Append one streamed increment to the overlay
    #[serde(rename = "display-chunk")]
    DisplayChunk { content: String },

    /// Replace the overlay text with the final result
    #[serde(rename = "display-result")]
    DisplayResult { content: String },

    /// Show the fixed failure message
    #[serde(rename = "display-failure")]
    DisplayFailure,
}

impl ContentRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            ContentRequest::GrabSelectedText => "grab-selected-text",
            ContentRequest::DisplayChunk { .. } => "display-chunk",
            ContentRequest::DisplayResult { .. } => "display-result",
            ContentRequest::DisplayFailure => "display-failure",
        }
    }
}

/// Replies sent from a tab back to the background controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentReply {
    /// Selection text, empty when nothing is selected
    SelectedText { text: String },

    /// Acknowledgment
    Ack { message: String },
}
