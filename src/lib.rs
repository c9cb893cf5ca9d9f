//! CTRL-B Library
//!
//! Orchestration core for running LLM text tasks on a page selection and
//! streaming the result back into an on-page overlay.

pub mod bridge;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod guard;
pub mod invoker;
pub mod registry;
pub mod task;

pub use controller::{BackgroundController, Extension, RunOutcome};
pub use error::{CtrlError, CtrlResult};
