//! Session lifecycle and message relay for browser connections.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::client::{build_request, A2AClient, CardResolver, HttpHandle};
use crate::error::InspectorError;
use crate::utils::{
    id_string, new_send_params, new_user_text_message, strip_nulls, INITIALIZE_CLIENT_ID,
    METHOD_MESSAGE_SEND, METHOD_MESSAGE_STREAM,
};

use super::events::{
    ClientFrame, DebugKind, ErrorReply, InitializeAck, InitializeClientRequest, OutboundEvent,
    SendMessageRequest, EVENT_AGENT_RESPONSE, EVENT_CLIENT_INITIALIZED, EVENT_INITIALIZE_CLIENT,
    EVENT_SEND_MESSAGE,
};
use super::normalizer::ResponseNormalizer;
use super::registry::{ConnectionRegistry, Session};
use super::socket::Emitter;

/// Handles `initialize_client`, `send_message` and disconnects.
pub struct Inspector {
    registry: Arc<ConnectionRegistry>,
    normalizer: ResponseNormalizer,
    request_timeout: Option<Duration>,
}

impl Inspector {
    pub fn new(registry: Arc<ConnectionRegistry>, emitter: Arc<dyn Emitter>) -> Self {
        Self {
            registry,
            normalizer: ResponseNormalizer::new(emitter),
            request_timeout: None,
        }
    }

    /// Bound every outbound request made by new sessions.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn normalizer(&self) -> &ResponseNormalizer {
        &self.normalizer
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    // ========================================================================
    // initialize_client
    // ========================================================================

    /// Fetch the agent card and bind a session for `conn_id`.
    ///
    /// Nothing is stored unless every step succeeds. A live session is
    /// replaced and its handle closed.
    pub async fn initialize(&self, conn_id: &str, request: InitializeClientRequest) -> InitializeAck {
        match self.try_initialize(conn_id, request).await {
            Ok(()) => InitializeAck::Success,
            Err(e) => {
                error!(%conn_id, error = %e, "client initialization failed");
                InitializeAck::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    async fn try_initialize(
        &self,
        conn_id: &str,
        request: InitializeClientRequest,
    ) -> Result<(), InspectorError> {
        let url = request
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| InspectorError::validation("Agent URL is required."))?;

        let handle = Arc::new(HttpHandle::new(request.custom_headers, self.request_timeout)?);
        let resolver = CardResolver::from_url(&url)?;

        self.normalizer
            .emit_debug(
                conn_id,
                DebugKind::Request,
                json!({
                    "endpoint": resolver.card_url(),
                    "method": "GET",
                    "headers": handle.headers(),
                }),
                INITIALIZE_CLIENT_ID,
            )
            .await;

        let resolved = match resolver.fetch(&handle).await {
            Ok(resolved) => resolved,
            Err(e) => {
                self.normalizer
                    .emit_debug(
                        conn_id,
                        DebugKind::Response,
                        json!({"error": e.to_string()}),
                        INITIALIZE_CLIENT_ID,
                    )
                    .await;
                close_quietly(conn_id, &handle);
                return Err(e.into());
            }
        };

        self.normalizer
            .emit_debug(
                conn_id,
                DebugKind::Response,
                resolved.raw.clone(),
                INITIALIZE_CLIENT_ID,
            )
            .await;

        let client = A2AClient::from_card(handle.clone(), &resolved.card);
        let session = Session::new(handle, Arc::new(client), resolved.card);
        info!(
            %conn_id,
            agent = %session.card.name,
            streaming = session.card.supports_streaming(),
            "client initialized"
        );

        if let Some(previous) = self.registry.put(conn_id, session).await {
            debug!(%conn_id, "replaced existing session");
            close_quietly(conn_id, &previous.handle);
        }
        Ok(())
    }

    // ========================================================================
    // send_message
    // ========================================================================

    /// Relay one user message to the connection's agent.
    ///
    /// Responses go out through the emitter. An `Err` is an immediate reply
    /// for the caller: no session, or no message text.
    pub async fn send_message(
        &self,
        conn_id: &str,
        request: SendMessageRequest,
    ) -> Result<(), ErrorReply> {
        let id = request
            .correlation_id()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        self.dispatch(conn_id, request, &id)
            .await
            .map_err(|e| ErrorReply {
                error: e.to_string(),
                id,
            })
    }

    async fn dispatch(
        &self,
        conn_id: &str,
        request: SendMessageRequest,
        id: &str,
    ) -> Result<(), InspectorError> {
        let session = self
            .registry
            .get(conn_id)
            .await
            .ok_or(InspectorError::NotInitialized)?;

        let text = request
            .message
            .filter(|t| !t.is_empty())
            .ok_or_else(|| InspectorError::validation("Message text is required."))?;

        let message = new_user_text_message(text, id, request.context_id, request.metadata);
        let streaming = session.card.supports_streaming();
        let method = if streaming {
            METHOD_MESSAGE_STREAM
        } else {
            METHOD_MESSAGE_SEND
        };
        let rpc_request = build_request(id, method, &new_send_params(message))?;

        let logged = serde_json::to_value(&rpc_request).unwrap_or(Value::Null);
        self.normalizer
            .emit_debug(conn_id, DebugKind::Request, strip_nulls(logged), id)
            .await;
        debug!(%conn_id, %id, %method, "sending message to agent");

        if streaming {
            let mut stream = match session.client.send_message_streaming(rpc_request).await {
                Ok(stream) => stream,
                Err(e) => {
                    self.report_send_failure(conn_id, &e.to_string(), id).await;
                    return Ok(());
                }
            };
            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(response) => self.normalizer.normalize(conn_id, response, id).await,
                    Err(e) => {
                        self.report_send_failure(conn_id, &e.to_string(), id).await;
                        break;
                    }
                }
            }
        } else {
            match session.client.send_message(rpc_request).await {
                Ok(response) => self.normalizer.normalize(conn_id, response, id).await,
                Err(e) => self.report_send_failure(conn_id, &e.to_string(), id).await,
            }
        }
        Ok(())
    }

    async fn report_send_failure(&self, conn_id: &str, reason: &str, id: &str) {
        error!(%conn_id, %id, error = %reason, "failed to send message");
        self.normalizer
            .emit_debug(conn_id, DebugKind::Error, json!({"message": reason}), id)
            .await;
        self.normalizer
            .emitter()
            .emit(
                conn_id,
                OutboundEvent::agent_response(json!({
                    "error": format!("Failed to send message: {reason}"),
                    "id": id,
                })),
            )
            .await;
    }

    // ========================================================================
    // disconnect
    // ========================================================================

    /// Drop the session of `conn_id` and close its handle. Idempotent.
    pub async fn teardown(&self, conn_id: &str) {
        if let Some(session) = self.registry.remove(conn_id).await {
            info!(%conn_id, agent = %session.card.name, "session closed");
            close_quietly(conn_id, &session.handle);
        }
    }

    // ========================================================================
    // channel frames
    // ========================================================================

    /// Route one text frame from `conn_id`.
    ///
    /// Returns the frame to send back, if any: an ack when the browser asked
    /// for one, otherwise the handler's reply as a plain event.
    pub async fn handle_frame(&self, conn_id: &str, text: &str) -> Option<OutboundEvent> {
        let raw: Value = match serde_json::from_str(text) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(%conn_id, error = %e, "dropping malformed frame");
                return None;
            }
        };
        let ack_id = raw.get("ackId").and_then(Value::as_u64);
        let frame: ClientFrame = match serde_json::from_value(raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(%conn_id, error = %e, "rejecting invalid frame");
                return ack_id.map(|ack| {
                    OutboundEvent::ack(ack, json!({"error": format!("Invalid frame: {e}")}))
                });
            }
        };

        let (reply_event, reply) = match frame.event.as_str() {
            EVENT_INITIALIZE_CLIENT => {
                let ack = match parse_payload::<InitializeClientRequest>(frame.data) {
                    Ok(request) => self.initialize(conn_id, request).await,
                    Err(message) => InitializeAck::Error { message },
                };
                (
                    EVENT_CLIENT_INITIALIZED,
                    Some(serde_json::to_value(ack).unwrap_or(Value::Null)),
                )
            }
            EVENT_SEND_MESSAGE => {
                let caller_id = frame.data.get("id").and_then(id_string).unwrap_or_default();
                let outcome = match parse_payload::<SendMessageRequest>(frame.data) {
                    Ok(request) => self.send_message(conn_id, request).await,
                    Err(message) => Err(ErrorReply {
                        error: message,
                        id: caller_id,
                    }),
                };
                let reply = outcome
                    .err()
                    .map(|reply| serde_json::to_value(reply).unwrap_or(Value::Null));
                (EVENT_AGENT_RESPONSE, reply)
            }
            other => {
                warn!(%conn_id, event = %other, "unknown event");
                return ack_id.map(|ack| {
                    OutboundEvent::ack(ack, json!({"error": format!("Unknown event: '{other}'.")}))
                });
            }
        };

        match (ack_id, reply) {
            (Some(ack), reply) => Some(OutboundEvent::ack(ack, reply.unwrap_or(Value::Null))),
            (None, Some(reply)) => Some(OutboundEvent::new(reply_event, reply)),
            (None, None) => None,
        }
    }
}

fn parse_payload<T: serde::de::DeserializeOwned + Default>(data: Value) -> Result<T, String> {
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|e| format!("Invalid payload: {e}"))
}

/// Close `handle`, logging instead of failing.
pub(super) fn close_quietly(conn_id: &str, handle: &HttpHandle) {
    if let Err(e) = handle.close() {
        warn!(%conn_id, error = %e, "failed to close outbound handle");
    }
}
