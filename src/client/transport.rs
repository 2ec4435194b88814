//! Outbound HTTP plumbing for talking to a remote agent.
//!
//! [`HttpHandle`] is the per-session outbound connection: a `reqwest` client
//! carrying the browser-supplied custom headers. It is owned by exactly one
//! inspector session and closed when that session goes away.
//!
//! [`Transport`] abstracts the JSON-RPC binding so the client can be driven
//! over something other than HTTP in tests; [`JsonRpcTransport`] is the
//! standard JSON-RPC-over-HTTP binding, using SSE for streaming methods.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::error::{A2AError, A2AResult};
use crate::types::{AgentResponse, JsonRpcRequest, JsonRpcResponse};

use super::sse::SseStream;

// ============================================================================
// HttpHandle
// ============================================================================

/// Closable outbound HTTP connection carrying custom headers.
#[derive(Debug)]
pub struct HttpHandle {
    client: reqwest::Client,
    headers: HashMap<String, String>,
    closed: AtomicBool,
}

impl HttpHandle {
    /// Build a handle that sends `headers` on every request.
    ///
    /// Headers with names or values that are not valid HTTP are skipped.
    /// `timeout` of `None` means requests may wait indefinitely.
    pub fn new(headers: HashMap<String, String>, timeout: Option<Duration>) -> A2AResult<Self> {
        let mut default_headers = HeaderMap::new();
        for (key, value) in &headers {
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(val)) => {
                    default_headers.insert(name, val);
                }
                _ => tracing::warn!(header = %key, "skipping invalid custom header"),
            }
        }

        let mut builder = reqwest::Client::builder().default_headers(default_headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| A2AError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            headers,
            closed: AtomicBool::new(false),
        })
    }

    /// The underlying client, or [`A2AError::Closed`] once the handle is closed.
    pub fn client(&self) -> A2AResult<&reqwest::Client> {
        if self.is_closed() {
            return Err(A2AError::Closed);
        }
        Ok(&self.client)
    }

    /// Custom headers this handle was built with.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Close the handle. Closing twice reports [`A2AError::Closed`].
    pub fn close(&self) -> A2AResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(A2AError::Closed);
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Transport abstraction for the A2A JSON-RPC binding.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a JSON-RPC request and receive a JSON-RPC response.
    async fn send(&self, request: &JsonRpcRequest) -> A2AResult<JsonRpcResponse>;

    /// Send a JSON-RPC request and receive an SSE event stream.
    async fn send_stream(&self, request: &JsonRpcRequest) -> A2AResult<SseStream>;
}

/// JSON-RPC over HTTP, sending through a shared [`HttpHandle`].
#[derive(Debug, Clone)]
pub struct JsonRpcTransport {
    handle: Arc<HttpHandle>,
    url: String,
}

impl JsonRpcTransport {
    /// Create a transport posting to `url` through `handle`.
    pub fn new(handle: Arc<HttpHandle>, url: impl Into<String>) -> Self {
        Self {
            handle,
            url: url.into(),
        }
    }

    /// Returns the URL this transport sends requests to.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, request: &JsonRpcRequest, accept: &str) -> A2AResult<reqwest::Response> {
        let body = serde_json::to_vec(request).map_err(|e| {
            A2AError::Transport(format!("failed to serialize JSON-RPC request: {e}"))
        })?;

        let response = self
            .handle
            .client()?
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, accept)
            .body(body)
            .send()
            .await
            .map_err(|e| A2AError::from_reqwest(&format!("POST {}", self.url), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(A2AError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

async fn decode_json_rpc(response: reqwest::Response) -> A2AResult<JsonRpcResponse> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| A2AError::Transport(format!("failed to read response body: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| A2AError::InvalidJson(format!("failed to parse JSON-RPC response: {e}")))
}

fn is_event_stream(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("text/event-stream"))
}

#[async_trait]
impl Transport for JsonRpcTransport {
    async fn send(&self, request: &JsonRpcRequest) -> A2AResult<JsonRpcResponse> {
        let response = self.post(request, "application/json").await?;
        decode_json_rpc(response).await
    }

    /// Open an SSE stream. An agent that answers with a plain JSON-RPC body
    /// instead (typically an error) yields that body as the only chunk.
    async fn send_stream(&self, request: &JsonRpcRequest) -> A2AResult<SseStream> {
        let response = self.post(request, "text/event-stream").await?;
        if is_event_stream(&response) {
            return Ok(SseStream::from_response(response));
        }

        tracing::debug!(url = %self.url, "streaming call answered without an event stream");
        let body = decode_json_rpc(response).await?;
        Ok(SseStream::once(AgentResponse::try_from(body)))
    }
}
