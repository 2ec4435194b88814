//! Wire shapes of the real-time channel.
//!
//! Browser frames are `{"event", "data", "ackId"?}`; server frames are
//! `{"event", "data"}` plus `ackId` on acknowledgements.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::id_string;

// ============================================================================
// Event names
// ============================================================================

pub const EVENT_CONNECTED: &str = "connected";
pub const EVENT_ACK: &str = "ack";
pub const EVENT_INITIALIZE_CLIENT: &str = "initialize_client";
pub const EVENT_CLIENT_INITIALIZED: &str = "client_initialized";
pub const EVENT_SEND_MESSAGE: &str = "send_message";
pub const EVENT_AGENT_RESPONSE: &str = "agent_response";
pub const EVENT_DEBUG_LOG: &str = "debug_log";

// ============================================================================
// Server -> browser
// ============================================================================

/// One frame sent to a browser connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEvent {
    pub event: String,
    #[serde(rename = "ackId", skip_serializing_if = "Option::is_none")]
    pub ack_id: Option<u64>,
    pub data: Value,
}

impl OutboundEvent {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            ack_id: None,
            data,
        }
    }

    /// Acknowledgement of the client frame that carried `ack_id`.
    pub fn ack(ack_id: u64, data: Value) -> Self {
        Self {
            event: EVENT_ACK.to_string(),
            ack_id: Some(ack_id),
            data,
        }
    }

    pub fn agent_response(data: Value) -> Self {
        Self::new(EVENT_AGENT_RESPONSE, data)
    }

    pub fn debug_log(log: DebugLog) -> Self {
        let data = serde_json::to_value(&log).unwrap_or(Value::Null);
        Self::new(EVENT_DEBUG_LOG, data)
    }
}

/// Phase of a debug-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugKind {
    Request,
    Response,
    Error,
}

/// Telemetry mirror shown in the inspector's debug console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugLog {
    #[serde(rename = "type")]
    pub kind: DebugKind,
    pub data: Value,
    pub id: String,
}

impl DebugLog {
    pub fn new(kind: DebugKind, data: Value, id: impl Into<String>) -> Self {
        Self {
            kind,
            data,
            id: id.into(),
        }
    }
}

/// Reply to `initialize_client`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InitializeAck {
    Success,
    Error { message: String },
}

/// Immediate error reply to `send_message`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReply {
    pub error: String,
    pub id: String,
}

// ============================================================================
// Browser -> server
// ============================================================================

/// A frame received from the browser.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Payload of `initialize_client`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeClientRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub custom_headers: HashMap<String, String>,
}

/// Payload of `send_message`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Correlation id; strings and numbers are accepted.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub context_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl SendMessageRequest {
    /// The caller's correlation id, if it sent a usable one.
    pub fn correlation_id(&self) -> Option<String> {
        self.id.as_ref().and_then(id_string)
    }
}
