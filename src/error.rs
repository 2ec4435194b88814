//! Error types — remote-agent failures and handler-boundary errors.
//!
//! - [`A2AError`] describes anything that goes wrong while talking to a
//!   remote agent: connection failures, non-2xx HTTP statuses and malformed
//!   JSON. JSON-RPC errors returned by the agent are not failures; they
//!   travel as [`AgentResponse::Error`](crate::types::AgentResponse::Error).
//! - [`InspectorError`] is what the inspector handlers report to the browser.
//!   It never crosses the channel boundary as a fault; handlers turn it into
//!   a structured reply.

// ---------------------------------------------------------------------------
// A2AError
// ---------------------------------------------------------------------------

/// Failure while talking to a remote A2A agent.
#[derive(Debug, Clone, thiserror::Error)]
pub enum A2AError {
    /// Transport-level error (connection refused, DNS, broken body, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request or stream timed out.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP error with status code and response body.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Invalid JSON received from remote (parse or deserialization failure).
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The agent URL could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending input.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The outbound handle was already closed.
    #[error("HTTP handle is closed")]
    Closed,
}

/// Convenience result type for remote-agent operations.
pub type A2AResult<T> = Result<T, A2AError>;

impl A2AError {
    /// Whether the failure happened reaching the agent rather than
    /// understanding its answer.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            A2AError::Transport(_) | A2AError::Timeout(_) | A2AError::Http { .. } | A2AError::Closed
        )
    }

    /// Map a `reqwest` send failure, tagging it with what was being attempted.
    pub(crate) fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            A2AError::Timeout(format!("{context} timed out: {err}"))
        } else if err.is_connect() {
            A2AError::Transport(format!("{context}: connection failed: {err}"))
        } else {
            A2AError::Transport(format!("{context} failed: {err}"))
        }
    }
}

impl From<serde_json::Error> for A2AError {
    fn from(err: serde_json::Error) -> Self {
        A2AError::InvalidJson(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// InspectorError
// ---------------------------------------------------------------------------

/// Error surfaced by an inspector handler.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InspectorError {
    /// Required input missing or malformed; nothing was mutated.
    #[error("{0}")]
    Validation(String),

    /// Dispatch on a connection that never initialized a session.
    #[error("Client not initialized.")]
    NotInitialized,

    /// The remote agent could not be reached or answered garbage.
    #[error(transparent)]
    Agent(#[from] A2AError),
}

impl InspectorError {
    /// Create a `Validation` error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this is a failure to reach the agent (HTTP 502 territory).
    pub fn is_network(&self) -> bool {
        matches!(self, InspectorError::Agent(e) if e.is_network())
    }
}
