//! # a2a-inspector — debugging relay for Agent-to-Agent (A2A) agents
//!
//! The inspector sits between a browser UI and a remote
//! [A2A](https://a2a-protocol.org/latest/specification/) agent. It fetches
//! and validates the agent's card, keeps one protocol client per browser
//! connection, relays user messages to the agent over JSON-RPC (streaming
//! via SSE when the card allows it) and sends every response back as an
//! `agent_response` event, mirrored by `debug_log` telemetry.
//!
//! ## Running
//!
//! ```text
//! a2a-inspector --host 127.0.0.1 --port 5001
//! ```
//!
//! ## Embedding
//!
//! ```no_run
//! use a2a_inspector::config::InspectorConfig;
//! use a2a_inspector::inspector::{router, AppState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = InspectorConfig::default();
//!     let app = router(AppState::new(&config));
//!     let listener = tokio::net::TcpListener::bind(config.bind_addr()?).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Channel protocol
//!
//! The browser connects to `GET /ws` and receives `{"event": "connected",
//! "data": {"sid": ...}}`. It then sends frames of the form
//! `{"event", "data", "ackId"?}`:
//!
//! - `initialize_client` `{url, customHeaders}` is answered with
//!   `{status: "success"}` or `{status: "error", message}`
//! - `send_message` `{message, id, contextId?, metadata?}` produces
//!   `debug_log` and `agent_response` events
//!
//! ## Architecture
//!
//! - [`client`]: HTTP handle, card resolver, JSON-RPC client and SSE stream
//! - [`inspector`]: registry, handlers, response normalizer, WebSocket hub, routes
//! - [`validators`]: agent card and response compliance checks
//! - [`types`]: the A2A wire types the relay consumes
//! - [`error`]: [`A2AError`] and [`InspectorError`]

pub mod client;
pub mod config;
pub mod error;
pub mod inspector;
pub mod types;
pub mod utils;
pub mod validators;

pub use error::{A2AError, A2AResult, InspectorError};
pub use types::*;
