//! The inspector relay.
//!
//! A browser opens the WebSocket channel, initializes a session against an
//! agent URL, then sends messages. Each message is relayed to the agent
//! (single-shot or streaming, per the agent card) and every response comes
//! back as an `agent_response` event mirrored by a `debug_log` event.
//!
//! - [`ConnectionRegistry`]: connection id to [`Session`]
//! - [`Inspector`]: initialize, send, teardown
//! - [`ResponseNormalizer`]: response to browser events
//! - [`SocketHub`] / [`Emitter`]: outbound delivery
//! - [`router`]: axum routes

mod handlers;
mod normalizer;
mod registry;
mod routes;
mod socket;

pub mod events;

pub use handlers::Inspector;
pub use normalizer::{effective_id, ResponseNormalizer};
pub use registry::{ConnectionRegistry, Session};
pub use routes::{router, AppState};
pub use socket::{Emitter, SocketHub};
