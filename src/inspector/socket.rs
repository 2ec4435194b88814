//! WebSocket channel between the inspector and browsers.
//!
//! Each connection gets an outbound queue drained by a writer task, and an
//! inbound queue drained by a single dispatcher task, so one connection's
//! frames are handled strictly in order while other connections interleave.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, trace, warn};

use super::events::{OutboundEvent, EVENT_CONNECTED};
use super::routes::AppState;

/// Delivers events to one browser connection.
#[async_trait]
pub trait Emitter: Send + Sync {
    /// Queue `event` for connection `to`. Unknown or closed connections
    /// drop the event.
    async fn emit(&self, to: &str, event: OutboundEvent);
}

/// Outbound queues of all live WebSocket connections.
#[derive(Debug)]
pub struct SocketHub {
    senders: RwLock<HashMap<String, mpsc::Sender<OutboundEvent>>>,
    capacity: usize,
}

impl SocketHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            senders: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Register a new connection and return its id and outbound queue.
    pub async fn register(&self) -> (String, mpsc::Receiver<OutboundEvent>) {
        let conn_id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(self.capacity);
        self.senders.write().await.insert(conn_id.clone(), tx);
        (conn_id, rx)
    }

    pub async fn unregister(&self, conn_id: &str) {
        self.senders.write().await.remove(conn_id);
    }

    /// Number of live connections.
    pub async fn len(&self) -> usize {
        self.senders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.senders.read().await.is_empty()
    }
}

#[async_trait]
impl Emitter for SocketHub {
    async fn emit(&self, to: &str, event: OutboundEvent) {
        let sender = self.senders.read().await.get(to).cloned();
        match sender {
            Some(tx) => {
                if tx.send(event).await.is_err() {
                    debug!(conn_id = %to, "connection closed, dropping event");
                }
            }
            None => debug!(conn_id = %to, event = %event.event, "no such connection, dropping event"),
        }
    }
}

/// `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (conn_id, mut outbound) = state.hub.register().await;
    info!(%conn_id, "browser connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    let writer_id = conn_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!(conn_id = %writer_id, error = %e, "failed to encode event");
                    continue;
                }
            };
            trace!(conn_id = %writer_id, event = %event.event, "sending frame");
            if ws_tx.send(WsMessage::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    state
        .hub
        .emit(
            &conn_id,
            OutboundEvent::new(EVENT_CONNECTED, json!({"sid": conn_id})),
        )
        .await;

    let (frame_tx, mut frame_rx) = mpsc::channel::<String>(state.hub.capacity);
    let dispatcher = {
        let inspector = Arc::clone(&state.inspector);
        let hub = Arc::clone(&state.hub);
        let conn_id = conn_id.clone();
        tokio::spawn(async move {
            while let Some(text) = frame_rx.recv().await {
                if let Some(reply) = inspector.handle_frame(&conn_id, &text).await {
                    hub.emit(&conn_id, reply).await;
                }
            }
        })
    };

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(WsMessage::Text(text)) => {
                if frame_tx.send(text.to_string()).await.is_err() {
                    break;
                }
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(%conn_id, error = %e, "websocket read failed");
                break;
            }
        }
    }

    // Abandon any in-flight relay before the session goes away.
    dispatcher.abort();
    let _ = dispatcher.await;
    state.inspector.teardown(&conn_id).await;
    state.hub.unregister(&conn_id).await;
    writer.abort();
    info!(%conn_id, "browser disconnected");
}
