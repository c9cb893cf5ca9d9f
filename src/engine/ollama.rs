//! Ollama Engine
//!
//! Runs text tasks against a local Ollama server through `/api/generate`.
//! Streaming responses arrive as newline-delimited JSON objects, one
//! increment each.

use super::{ChunkStream, LlmEngine};
use crate::config::Config;
use crate::error::{CtrlError, CtrlResult};
use crate::task::TaskRequest;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Ollama generate request body
#[derive(Debug, Serialize)]
struct Payload<'a> {
    model: &'a str,
    prompt: String,
    keep_alive: &'a str,
    stream: bool,
}

/// Ollama generate response object as sent (whole body, or one NDJSON line)
#[derive(Debug, Deserialize)]
struct RawResponse {
    response: Option<String>,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

/// Validated generate response
#[derive(Debug)]
struct OllamaResponse {
    response: String,
    done: bool,
}

impl OllamaResponse {
    fn parse(line: &[u8]) -> CtrlResult<Self> {
        let raw: RawResponse = serde_json::from_slice(line).map_err(|e| {
            CtrlError::Engine(format!(
                "Failed to parse ollama response to expected json: {} (text was {:?})",
                e,
                String::from_utf8_lossy(line)
            ))
        })?;

        if let Some(error) = raw.error {
            return Err(CtrlError::Engine(format!("ollama reported: {error}")));
        }
        match raw.response {
            Some(response) => Ok(Self {
                response,
                done: raw.done,
            }),
            None => Err(CtrlError::Engine(format!(
                "ollama response has no `response` field (text was {:?})",
                String::from_utf8_lossy(line)
            ))),
        }
    }
}

/// Engine backed by an Ollama server
#[derive(Clone)]
pub struct OllamaEngine {
    client: reqwest::Client,
    keep_alive: String,
    timeout: Option<Duration>,
}

impl OllamaEngine {
    /// Create new Ollama engine from config
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            keep_alive: config.keep_alive.clone(),
            timeout: config.request_timeout(),
        }
    }

    /// Health check - verify Ollama is reachable
    pub async fn health_check(&self, url: &str) -> bool {
        match self
            .client
            .get(format!("{}/api/tags", base_url(url)))
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Send a generate request, validating the status code
    async fn request(&self, request: &TaskRequest, stream: bool) -> CtrlResult<reqwest::Response> {
        let payload = Payload {
            model: &request.model,
            prompt: request.prompt(),
            keep_alive: &self.keep_alive,
            stream,
        };

        let mut builder = self
            .client
            .post(format!("{}/api/generate", base_url(&request.url)))
            .json(&payload);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        debug!("🧠 Ollama request: model={} stream={}", request.model, stream);
        let resp = builder.send().await.map_err(map_transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("❌ Ollama API Error ({}): {}", status, body);
            return Err(map_status(status, &body));
        }
        Ok(resp)
    }
}

#[async_trait]
impl LlmEngine for OllamaEngine {
    async fn complete(&self, request: &TaskRequest) -> CtrlResult<String> {
        let resp = self.request(request, false).await?;
        let body = resp.bytes().await.map_err(map_transport_error)?;
        Ok(OllamaResponse::parse(&body)?.response)
    }

    async fn stream(&self, request: &TaskRequest) -> CtrlResult<ChunkStream> {
        let resp = self.request(request, true).await?;
        let bytes = resp
            .bytes_stream()
            .map(|item| {
                item.map(|b| b.to_vec()).map_err(|e| {
                    CtrlError::Engine(format!("Failed to get bytes from ollama response: {e}"))
                })
            })
            .boxed();

        let state = LineState {
            bytes,
            decoder: LineDecoder::default(),
            done: false,
        };

        let chunks = stream::unfold(state, |mut state| async move {
            loop {
                if state.done {
                    return None;
                }
                if let Some(line) = state.decoder.next_line() {
                    match OllamaResponse::parse(&line) {
                        Ok(parsed) => {
                            state.done = parsed.done;
                            if parsed.response.is_empty() {
                                continue;
                            }
                            return Some((Ok(parsed.response), state));
                        }
                        Err(e) => {
                            state.done = true;
                            return Some((Err(e), state));
                        }
                    }
                }
                match state.bytes.next().await {
                    Some(Ok(bytes)) => state.decoder.push(&bytes),
                    Some(Err(e)) => {
                        state.done = true;
                        return Some((Err(e), state));
                    }
                    None => {
                        state.done = true;
                        // Tolerate a final object without trailing newline
                        let Some(rest) = state.decoder.finish() else {
                            return None;
                        };
                        return match OllamaResponse::parse(&rest) {
                            Ok(parsed) if parsed.response.is_empty() => None,
                            Ok(parsed) => Some((Ok(parsed.response), state)),
                            Err(e) => Some((Err(e), state)),
                        };
                    }
                }
            }
        });

        Ok(ChunkStream::new(chunks.boxed()))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

struct LineState {
    bytes: BoxStream<'static, CtrlResult<Vec<u8>>>,
    decoder: LineDecoder,
    done: bool,
}

/// Splits a byte stream into newline-terminated lines, buffering partial
/// lines across network frames.
#[derive(Debug, Default)]
struct LineDecoder {
    buf: Vec<u8>,
}

impl LineDecoder {
    fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Next complete, non-blank line
    fn next_line(&mut self) -> Option<Vec<u8>> {
        loop {
            let pos = self.buf.iter().position(|b| *b == b'\n')?;
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if !line.iter().all(u8::is_ascii_whitespace) {
                return Some(line);
            }
        }
    }

    /// Whatever is left once the body ends
    fn finish(&mut self) -> Option<Vec<u8>> {
        let rest = std::mem::take(&mut self.buf);
        if rest.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(rest)
        }
    }
}

fn base_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

fn map_status(status: StatusCode, body: &str) -> CtrlError {
    match status {
        StatusCode::BAD_REQUEST => CtrlError::Engine("Bad request".to_string()),
        StatusCode::NOT_FOUND => CtrlError::EngineConnection("is ollama running?".to_string()),
        code => CtrlError::EngineUnexpected(format!("{}: {}", code, body)),
    }
}

fn map_transport_error(err: reqwest::Error) -> CtrlError {
    if err.is_timeout() {
        return CtrlError::EngineTimeout(format!("Request timeout: {err}"));
    }
    if err.is_connect() {
        return CtrlError::EngineConnection(format!("is ollama running? {err}"));
    }
    CtrlError::Engine(format!("Unexpected API call failure: {err}"))
}
