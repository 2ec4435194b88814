//! Protocol client bound to one remote agent endpoint.
//!
//! The inspector never decodes agent payloads into typed results; it relays
//! them. So unlike a general SDK client, calls here return
//! [`AgentResponse`] values (success payload or JSON-RPC error) and only fail
//! with [`A2AError`] when the agent could not be reached or spoke garbage.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::Serialize;

use crate::error::{A2AError, A2AResult};
use crate::types::{AgentCard, AgentResponse, JsonRpcId, JsonRpcRequest};

use super::transport::{HttpHandle, JsonRpcTransport, Transport};

/// Ordered, finite sequence of response chunks from a streaming call.
pub type ResponseStream = Pin<Box<dyn Stream<Item = A2AResult<AgentResponse>> + Send>>;

/// The calls the inspector makes against a remote agent.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Single-shot call (`message/send`); exactly one response.
    async fn send_message(&self, request: JsonRpcRequest) -> A2AResult<AgentResponse>;

    /// Streaming call (`message/stream`).
    async fn send_message_streaming(&self, request: JsonRpcRequest) -> A2AResult<ResponseStream>;
}

/// JSON-RPC client for an A2A agent.
pub struct A2AClient {
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for A2AClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2AClient").finish_non_exhaustive()
    }
}

impl A2AClient {
    /// Bind a client to the JSON-RPC endpoint advertised by `card`, sending
    /// through `handle`.
    pub fn from_card(handle: Arc<HttpHandle>, card: &AgentCard) -> Self {
        let url = card.jsonrpc_url();
        tracing::debug!(agent = %card.name, %url, "binding client to agent endpoint");
        Self::with_transport(Box::new(JsonRpcTransport::new(handle, url)))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl AgentClient for A2AClient {
    async fn send_message(&self, request: JsonRpcRequest) -> A2AResult<AgentResponse> {
        let response = self.transport.send(&request).await?;
        AgentResponse::try_from(response)
    }

    async fn send_message_streaming(&self, request: JsonRpcRequest) -> A2AResult<ResponseStream> {
        let stream = self.transport.send_stream(&request).await?;
        Ok(stream.boxed())
    }
}

/// Build a JSON-RPC request carrying `params`.
pub fn build_request(
    id: impl Into<JsonRpcId>,
    method: &str,
    params: &impl Serialize,
) -> A2AResult<JsonRpcRequest> {
    let params = serde_json::to_value(params)
        .map_err(|e| A2AError::Transport(format!("failed to serialize request params: {e}")))?;
    Ok(JsonRpcRequest::new(id, method, Some(params)))
}
