//! A2A protocol types consumed by the inspector.
//!
//! Only the subset of the A2A v0.3 wire contract the inspector touches is
//! modelled here: the outgoing user message, the agent card, and the
//! JSON-RPC envelopes. Response payloads are kept as raw JSON so that any
//! shape an agent sends (task, message, status or artifact update, or
//! something non-compliant) can be shown to the user and validated.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{A2AError, A2AResult};

// ============================================================================
// Messages
// ============================================================================

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message from the user / client.
    User,
    /// Message from the agent / server.
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

/// File content — either inline base64 bytes or a URI reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileContent {
    /// Inline base64-encoded file.
    #[serde(rename_all = "camelCase")]
    Bytes {
        bytes: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// File referenced by URI.
    #[serde(rename_all = "camelCase")]
    Uri {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

/// A content part within a message, discriminated by `kind`.
///
/// - Text: `{"kind": "text", "text": "hello"}`
/// - File: `{"kind": "file", "file": {"uri": "...", "mimeType": "..."}}`
/// - Data: `{"kind": "data", "data": {"key": "value"}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    /// Plain text.
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    /// A file.
    File {
        file: FileContent,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    /// Arbitrary structured data.
    Data {
        data: serde_json::Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            metadata: None,
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub message_id: String,

    /// Who sent this message.
    pub role: Role,

    /// Discriminator field — always "message".
    #[serde(default = "kind_message")]
    pub kind: String,

    /// Content parts of the message.
    pub parts: Vec<Part>,

    /// Context this message belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// Task this message is associated with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

fn kind_message() -> String {
    "message".to_string()
}

impl Message {
    /// Create a user message with a single text part.
    pub fn user(message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Message {
            message_id: message_id.into(),
            role: Role::User,
            kind: kind_message(),
            parts: vec![Part::text(text)],
            context_id: None,
            task_id: None,
            metadata: None,
        }
    }
}

// ============================================================================
// Agent Card
// ============================================================================

/// Self-describing manifest for an A2A agent.
///
/// Parsing is deliberately lenient beyond the fields the inspector relies
/// on; compliance problems are reported by
/// [`validate_agent_card`](crate::validators::validate_agent_card) instead of
/// failing the fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// Human-readable name.
    pub name: String,

    /// Description of the agent's capabilities.
    #[serde(default)]
    pub description: String,

    /// Primary URL for the agent's A2A endpoint.
    pub url: String,

    /// Agent version string.
    #[serde(default)]
    pub version: String,

    /// Agent capabilities.
    #[serde(default)]
    pub capabilities: AgentCapabilities,

    /// Default MIME types accepted as input.
    #[serde(default)]
    pub default_input_modes: Vec<String>,

    /// Default MIME types produced as output.
    #[serde(default)]
    pub default_output_modes: Vec<String>,

    /// Skills the agent supports.
    #[serde(default)]
    pub skills: Vec<AgentSkill>,

    /// Transport interfaces the agent exposes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_interfaces: Vec<AgentInterface>,

    /// Additional interfaces (pre-0.3 spelling of `supportedInterfaces`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_interfaces: Option<Vec<AgentInterface>>,

    /// Preferred transport protocol (e.g. "JSONRPC").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_transport: Option<String>,

    /// Protocol version advertised by the agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,

    /// Service provider information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<AgentProvider>,

    /// URL to the agent's documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,

    /// URL to the agent's icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    /// Security scheme definitions, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<serde_json::Value>,

    /// Security requirements, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<serde_json::Value>,

    /// Whether the agent supports an authenticated extended card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_authenticated_extended_card: Option<bool>,
}

impl AgentCard {
    /// Whether the card explicitly advertises streaming support.
    pub fn supports_streaming(&self) -> bool {
        self.capabilities.streaming == Some(true)
    }

    /// The JSON-RPC endpoint for this agent.
    ///
    /// The first interface declaring the `JSONRPC` transport wins; otherwise
    /// the card's primary `url` is used.
    pub fn jsonrpc_url(&self) -> &str {
        self.supported_interfaces
            .iter()
            .chain(self.additional_interfaces.iter().flatten())
            .find(|iface| iface.transport.eq_ignore_ascii_case("JSONRPC"))
            .map(|iface| iface.url.as_str())
            .unwrap_or(&self.url)
    }
}

/// A transport interface supported by an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInterface {
    /// URL of the interface endpoint.
    pub url: String,

    /// Transport protocol (e.g. "JSONRPC", "HTTP+JSON", "GRPC").
    pub transport: String,
}

/// Agent capabilities declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// Whether the agent supports streaming responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,

    /// Whether the agent supports push notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,

    /// Whether the agent keeps a history of task state transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_transition_history: Option<bool>,

    /// Protocol extensions, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<serde_json::Value>>,
}

/// A skill that an agent can perform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    /// Unique skill identifier.
    pub id: String,

    /// Human-readable skill name.
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_modes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_modes: Option<Vec<String>>,
}

/// Information about the agent's provider/organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProvider {
    pub organization: String,
    pub url: String,
}

// ============================================================================
// JSON-RPC Foundation
// ============================================================================

/// A JSON-RPC 2.0 request ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    /// String identifier.
    String(String),
    /// Numeric identifier.
    Number(i64),
}

impl fmt::Display for JsonRpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonRpcId::String(s) => write!(f, "{}", s),
            JsonRpcId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for JsonRpcId {
    fn from(s: String) -> Self {
        JsonRpcId::String(s)
    }
}

impl From<&str> for JsonRpcId {
    fn from(s: &str) -> Self {
        JsonRpcId::String(s.to_string())
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version — always "2.0".
    pub jsonrpc: String,

    /// Request identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,

    /// Method name.
    pub method: String,

    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(
        id: impl Into<JsonRpcId>,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
    ) -> Self {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 response as it comes off the wire.
///
/// Exactly one of `result` or `error` should be present; use
/// [`AgentResponse::try_from`] to get the closed form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version — always "2.0".
    pub jsonrpc: String,

    /// Request identifier this response corresponds to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,

    /// Successful result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Error result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,

    /// Human-readable error message.
    pub message: String,

    /// Optional structured error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

// ============================================================================
// message/send parameters
// ============================================================================

/// Parameters for `message/send` and `message/stream`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageParams {
    /// The message to send.
    pub message: Message,

    /// Optional send configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<SendMessageConfiguration>,

    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Configuration for a `message/send` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageConfiguration {
    /// MIME types the client can accept as output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_output_modes: Option<Vec<String>>,

    /// Maximum number of history messages to include in the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_length: Option<i32>,

    /// Whether the request should block until the task completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,
}

// ============================================================================
// AgentResponse (success | error)
// ============================================================================

/// A successful JSON-RPC answer; `result` is the undecoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessResponse {
    pub id: Option<JsonRpcId>,
    pub result: serde_json::Value,
}

/// A JSON-RPC error answer from the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub id: Option<JsonRpcId>,
    pub error: JsonRpcError,
}

/// One response from a remote agent, either a whole `message/send` answer
/// or a single chunk of a `message/stream` answer.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentResponse {
    Success(SuccessResponse),
    Error(ErrorResponse),
}

impl AgentResponse {
    /// Build a success response.
    pub fn success(id: Option<JsonRpcId>, result: serde_json::Value) -> Self {
        AgentResponse::Success(SuccessResponse { id, result })
    }

    /// Build an error response.
    pub fn error(id: Option<JsonRpcId>, code: i64, message: impl Into<String>) -> Self {
        AgentResponse::Error(ErrorResponse {
            id,
            error: JsonRpcError {
                code,
                message: message.into(),
                data: None,
            },
        })
    }

    /// The JSON-RPC envelope id, if the agent echoed one.
    pub fn rpc_id(&self) -> Option<&JsonRpcId> {
        match self {
            AgentResponse::Success(s) => s.id.as_ref(),
            AgentResponse::Error(e) => e.id.as_ref(),
        }
    }
}

impl TryFrom<JsonRpcResponse> for AgentResponse {
    type Error = A2AError;

    fn try_from(response: JsonRpcResponse) -> A2AResult<Self> {
        match (response.error, response.result) {
            (Some(error), _) => Ok(AgentResponse::Error(ErrorResponse {
                id: response.id,
                error,
            })),
            (None, Some(result)) => Ok(AgentResponse::Success(SuccessResponse {
                id: response.id,
                result,
            })),
            (None, None) => Err(A2AError::InvalidJson(
                "JSON-RPC response has neither 'result' nor 'error'".to_string(),
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
