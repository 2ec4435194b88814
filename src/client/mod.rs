//! Protocol client used by the inspector to reach remote agents.
//!
//! - [`HttpHandle`]: the owned outbound connection, carrying custom headers
//! - [`CardResolver`]: locate and fetch an agent card
//! - [`AgentClient`] / [`A2AClient`]: `message/send` and `message/stream`
//! - [`Transport`] / [`JsonRpcTransport`]: JSON-RPC over HTTP
//! - [`SseStream`]: streaming responses as [`AgentResponse`](crate::types::AgentResponse) chunks
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use a2a_inspector::client::{build_request, A2AClient, AgentClient, CardResolver, HttpHandle};
//! use a2a_inspector::types::{Message, SendMessageParams};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = Arc::new(HttpHandle::new(HashMap::new(), None)?);
//! let resolved = CardResolver::from_url("http://localhost:7420")?
//!     .fetch(&handle)
//!     .await?;
//! let client = A2AClient::from_card(handle, &resolved.card);
//!
//! let params = SendMessageParams {
//!     message: Message::user("req-1", "Hello, agent!"),
//!     configuration: None,
//!     metadata: None,
//! };
//! let response = client
//!     .send_message(build_request("req-1", "message/send", &params)?)
//!     .await?;
//! println!("{response:?}");
//! # Ok(())
//! # }
//! ```

mod a2a_client;
mod card_resolver;
mod sse;
mod transport;

pub use a2a_client::{build_request, A2AClient, AgentClient, ResponseStream};
pub use card_resolver::{CardResolver, ResolvedCard};
pub use sse::SseStream;
pub use transport::{HttpHandle, JsonRpcTransport, Transport};
