//! Task Invoker
//!
//! Uniform "one result" or "stream of chunks" contract over an [`LlmEngine`].
//! Failures are returned as-is; nothing is retried here.

use crate::engine::{ChunkStream, LlmEngine};
use crate::error::CtrlResult;
use crate::task::TaskRequest;
use std::sync::Arc;
use tracing::debug;

/// How the engine is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeMode {
    Batch,
    Streaming,
}

/// What a successful invocation produced
#[derive(Debug)]
pub enum TaskOutput {
    /// Full text in one piece
    Complete(String),
    /// Increments still to be pulled
    Streaming(ChunkStream),
}

#[derive(Clone)]
pub struct TaskInvoker {
    engine: Arc<dyn LlmEngine>,
    mode: InvokeMode,
}

impl TaskInvoker {
    pub fn new(engine: Arc<dyn LlmEngine>, mode: InvokeMode) -> Self {
        Self { engine, mode }
    }

    pub fn mode(&self) -> InvokeMode {
        self.mode
    }

    /// Start the engine call for `request`
    pub async fn invoke(&self, request: &TaskRequest) -> CtrlResult<TaskOutput> {
        debug!(
            "Invoking {} ({:?}) for {:?}, {} chars",
            self.engine.name(),
            self.mode,
            request.kind,
            request.text.len()
        );
        match self.mode {
            InvokeMode::Batch => Ok(TaskOutput::Complete(self.engine.complete(request).await?)),
            InvokeMode::Streaming => Ok(TaskOutput::Streaming(self.engine.stream(request).await?)),
        }
    }

    /// Run `request` to settlement, handing each increment to `on_chunk`.
    ///
    /// In batch mode the full text is delivered as a single call. Resolves only
    /// after the last increment was handed over.
    pub async fn invoke_with<F>(&self, request: &TaskRequest, mut on_chunk: F) -> CtrlResult<()>
    where
        F: FnMut(String),
    {
        match self.invoke(request).await? {
            TaskOutput::Complete(text) => on_chunk(text),
            TaskOutput::Streaming(mut stream) => {
                while let Some(chunk) = stream.next().await {
                    on_chunk(chunk?);
                }
            }
        }
        Ok(())
    }
}
