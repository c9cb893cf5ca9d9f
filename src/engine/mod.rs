//! LLM Engine Module
//!
//! The external inference boundary. An engine either returns one completed
//! string or a lazy stream of text increments.

pub mod ollama;

use crate::error::{CtrlError, CtrlResult};
use crate::task::TaskRequest;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};

pub use ollama::OllamaEngine;

/// Trait for LLM engines
#[async_trait]
pub trait LlmEngine: Send + Sync {
    /// Run the request and return the full response text
    async fn complete(&self, request: &TaskRequest) -> CtrlResult<String>;

    /// Run the request and return the response as incremental chunks
    async fn stream(&self, request: &TaskRequest) -> CtrlResult<ChunkStream>;

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Finite, non-restartable sequence of text increments.
///
/// Yields `Ok(chunk)` in production order and ends with `None` on completion.
/// An `Err` is terminal: the stream yields nothing after it.
pub struct ChunkStream {
    inner: Option<BoxStream<'static, CtrlResult<String>>>,
}

impl ChunkStream {
    pub fn new(inner: BoxStream<'static, CtrlResult<String>>) -> Self {
        Self { inner: Some(inner) }
    }

    /// Stream over already-known chunks
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        Self::new(futures::stream::iter(chunks.into_iter().map(Ok)).boxed())
    }

    /// Stream that yields `chunks` and then fails with `error`
    pub fn failing_after<I>(chunks: I, error: CtrlError) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        let head = futures::stream::iter(chunks.into_iter().map(Ok));
        let tail = futures::stream::once(async move { Err(error) });
        Self::new(head.chain(tail).boxed())
    }

    /// Next increment, `None` once the stream has settled
    pub async fn next(&mut self) -> Option<CtrlResult<String>> {
        let inner = self.inner.as_mut()?;
        match inner.next().await {
            Some(Ok(chunk)) => Some(Ok(chunk)),
            Some(Err(e)) => {
                self.inner = None;
                Some(Err(e))
            }
            None => {
                self.inner = None;
                None
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_none()
    }
}

impl std::fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream")
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chunks_in_order_then_end() {
        let mut stream = ChunkStream::from_chunks(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(stream.next().await.unwrap().unwrap(), "a");
        assert_eq!(stream.next().await.unwrap().unwrap(), "b");
        assert!(stream.next().await.is_none());
        assert!(stream.is_finished());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_error_is_terminal() {
        let mut stream = ChunkStream::failing_after(
            vec!["partial".to_string()],
            CtrlError::Engine("broken body".into()),
        );
        assert_eq!(stream.next().await.unwrap().unwrap(), "partial");
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.is_finished());
        assert!(stream.next().await.is_none());
    }
}
