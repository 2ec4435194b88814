//! Per-connection session storage.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::client::{AgentClient, HttpHandle};
use crate::types::AgentCard;

/// Everything one browser connection needs to talk to its agent.
///
/// The session owns its [`HttpHandle`]; dropping the session from the
/// registry without closing the handle leaks the outbound connection.
pub struct Session {
    pub handle: Arc<HttpHandle>,
    pub client: Arc<dyn AgentClient>,
    pub card: AgentCard,
}

impl Session {
    pub fn new(handle: Arc<HttpHandle>, client: Arc<dyn AgentClient>, card: AgentCard) -> Self {
        Self {
            handle,
            client,
            card,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("agent", &self.card.name)
            .field("closed", &self.handle.is_closed())
            .finish_non_exhaustive()
    }
}

/// Map from connection id to its live [`Session`].
///
/// Callers only ever touch their own key, and the channel layer runs one
/// handler per connection at a time, so per-key races cannot occur.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `session` for `conn_id`, returning the session it replaced.
    pub async fn put(&self, conn_id: &str, session: Session) -> Option<Arc<Session>> {
        self.sessions
            .write()
            .await
            .insert(conn_id.to_string(), Arc::new(session))
    }

    pub async fn get(&self, conn_id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(conn_id).cloned()
    }

    pub async fn remove(&self, conn_id: &str) -> Option<Arc<Session>> {
        self.sessions.write().await.remove(conn_id)
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
