//! Mock LLM Engine for Testing
//!
//! Returns scripted outcomes and records every request it receives.

use async_trait::async_trait;
use ctrlb::engine::{ChunkStream, LlmEngine};
use ctrlb::task::TaskRequest;
use ctrlb::{CtrlError, CtrlResult};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// What the engine answers with
#[derive(Debug, Clone)]
pub enum Script {
    Single(String),
    Chunks(Vec<String>),
    Fail(String),
    FailAfter(Vec<String>, String),
}

/// Holds the engine inside a call until the test releases it
#[derive(Debug, Default)]
pub struct Gate {
    pub started: Notify,
    pub release: Notify,
}

pub struct MockEngine {
    script: Script,
    /// All requests received
    pub calls: Arc<Mutex<Vec<TaskRequest>>>,
    gate: Option<Arc<Gate>>,
}

impl MockEngine {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    pub fn single(text: &str) -> Self {
        Self::new(Script::Single(text.to_string()))
    }

    pub fn chunks(chunks: &[&str]) -> Self {
        Self::new(Script::Chunks(chunks.iter().map(|c| c.to_string()).collect()))
    }

    pub fn failing(reason: &str) -> Self {
        Self::new(Script::Fail(reason.to_string()))
    }

    /// Block inside each call until `gate.release` is notified
    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<TaskRequest> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, request: &TaskRequest) {
        self.calls.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
    }
}

#[async_trait]
impl LlmEngine for MockEngine {
    async fn complete(&self, request: &TaskRequest) -> CtrlResult<String> {
        self.enter(request).await;
        match &self.script {
            Script::Single(text) => Ok(text.clone()),
            Script::Chunks(chunks) => Ok(chunks.concat()),
            Script::Fail(reason) | Script::FailAfter(_, reason) => {
                Err(CtrlError::EngineConnection(reason.clone()))
            }
        }
    }

    async fn stream(&self, request: &TaskRequest) -> CtrlResult<ChunkStream> {
        self.enter(request).await;
        match &self.script {
            Script::Single(text) => Ok(ChunkStream::from_chunks(vec![text.clone()])),
            Script::Chunks(chunks) => Ok(ChunkStream::from_chunks(chunks.clone())),
            Script::Fail(reason) => Err(CtrlError::EngineConnection(reason.clone())),
            Script::FailAfter(chunks, reason) => Ok(ChunkStream::failing_after(
                chunks.clone(),
                CtrlError::Engine(reason.clone()),
            )),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
