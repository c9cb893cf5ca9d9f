//! Background ↔ Content Bridge
//!
//! Message protocol, the in-page handler, and point-to-point tab delivery.
//! Protocol: one JSON object per request, one per reply.

pub mod content;
pub mod messages;
pub mod tabs;

pub use content::{ContentBridge, Overlay, OverlayPhase, Page, FAILURE_TEXT, LOADING_TEXT};
pub use messages::*;
pub use tabs::{LocalTabs, TabHandle, TabId, TabMessenger};
