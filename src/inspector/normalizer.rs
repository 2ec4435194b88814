//! Turns agent responses into browser events.
//!
//! Every response, success or JSON-RPC error, produces exactly two frames
//! for the originating connection: a `debug_log` mirror followed by one
//! `agent_response`. Both carry the same effective correlation id.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::types::AgentResponse;
use crate::utils::{id_string, strip_nulls};
use crate::validators::validate_message;

use super::events::{DebugKind, DebugLog, OutboundEvent};
use super::socket::Emitter;

/// The id a response correlates under.
///
/// A success payload that names itself (e.g. a task's `id`) wins; otherwise,
/// and for every error, the caller's id is used. A `null` id counts as absent.
pub fn effective_id(response: &AgentResponse, fallback: &str) -> String {
    match response {
        AgentResponse::Success(success) => success
            .result
            .get("id")
            .and_then(id_string)
            .unwrap_or_else(|| fallback.to_string()),
        AgentResponse::Error(_) => fallback.to_string(),
    }
}

#[derive(Clone)]
pub struct ResponseNormalizer {
    emitter: Arc<dyn Emitter>,
}

impl ResponseNormalizer {
    pub fn new(emitter: Arc<dyn Emitter>) -> Self {
        Self { emitter }
    }

    /// Emit the debug mirror and the normalized `agent_response` for one
    /// response to `conn_id`.
    pub async fn normalize(&self, conn_id: &str, response: AgentResponse, fallback_id: &str) {
        let id = effective_id(&response, fallback_id);

        match response {
            AgentResponse::Success(success) => {
                let payload = strip_nulls(success.result);
                let validation_errors = validate_message(&payload);
                let mut mapping = match payload {
                    Value::Object(map) => map,
                    other => {
                        let mut map = Map::new();
                        map.insert("result".to_string(), other);
                        map
                    }
                };
                mapping.insert("id".to_string(), Value::String(id.clone()));
                mapping.insert("validation_errors".to_string(), json!(validation_errors));
                let data = Value::Object(mapping);

                tracing::debug!(%conn_id, %id, "relaying agent response");
                self.emit_debug(conn_id, DebugKind::Response, data.clone(), &id)
                    .await;
                self.emitter
                    .emit(conn_id, OutboundEvent::agent_response(data))
                    .await;
            }
            AgentResponse::Error(failure) => {
                let error = failure.error;
                tracing::debug!(%conn_id, %id, code = error.code, "relaying agent error");
                let data = strip_nulls(json!({
                    "code": error.code,
                    "message": error.message,
                    "data": error.data,
                }));
                self.emit_debug(conn_id, DebugKind::Error, data, &id).await;
                self.emitter
                    .emit(
                        conn_id,
                        OutboundEvent::agent_response(json!({"error": error.message, "id": id})),
                    )
                    .await;
            }
        }
    }

    /// Emit a `debug_log` entry to `conn_id`.
    pub async fn emit_debug(&self, conn_id: &str, kind: DebugKind, data: Value, id: &str) {
        self.emitter
            .emit(
                conn_id,
                OutboundEvent::debug_log(DebugLog::new(kind, data, id)),
            )
            .await;
    }

    pub fn emitter(&self) -> &Arc<dyn Emitter> {
        &self.emitter
    }
}
