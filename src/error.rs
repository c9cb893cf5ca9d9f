//! CTRL-B Error Types
//!
//! Centralized error handling for the background controller, the engine
//! adapter and the content bridge.

use thiserror::Error;

/// Central error type for CTRL-B
#[derive(Error, Debug)]
pub enum CtrlError {
    #[error("LLM timeout error: {0}")]
    EngineTimeout(String),

    #[error("LLM connection error: {0}")]
    EngineConnection(String),

    #[error("LLM generic error: {0}")]
    Engine(String),

    #[error("Unexpected LLM error: {0}")]
    EngineUnexpected(String),

    #[error("Message delivery to tab {tab} failed: {reason}")]
    Delivery { tab: u32, reason: String },

    #[error("Action registry error: {0}")]
    Registry(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CtrlError {
    /// True for failures raised by the external engine boundary
    pub fn is_engine(&self) -> bool {
        matches!(
            self,
            CtrlError::EngineTimeout(_)
                | CtrlError::EngineConnection(_)
                | CtrlError::Engine(_)
                | CtrlError::EngineUnexpected(_)
        )
    }
}

/// Result type alias for CTRL-B operations
pub type CtrlResult<T> = Result<T, CtrlError>;

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for CtrlError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        CtrlError::Lock(err.to_string())
    }
}
