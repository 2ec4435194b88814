//! HTTP surface of the inspector.
//!
//! # Routes
//!
//! - `GET /ws`: real-time channel (see [`socket`](super::socket))
//! - `POST /agent-card`: one-shot card fetch and validation for a connection
//! - `GET /health`: liveness and connection count

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::client::{CardResolver, HttpHandle};
use crate::config::InspectorConfig;
use crate::error::InspectorError;
use crate::utils::{strip_nulls, HTTP_AGENT_CARD_ID};
use crate::validators::validate_agent_card;

use super::events::DebugKind;
use super::handlers::{close_quietly, Inspector};
use super::registry::ConnectionRegistry;
use super::socket::{ws_handler, SocketHub};

/// Request headers that describe the browser hop and are not forwarded.
const HOP_HEADERS: [&str; 13] = [
    "host",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
    "content-type",
    "accept",
    "accept-encoding",
];

/// Shared state for the axum routes.
#[derive(Clone)]
pub struct AppState {
    pub inspector: Arc<Inspector>,
    pub hub: Arc<SocketHub>,
}

impl AppState {
    /// Wire a hub, a registry and the handlers together.
    pub fn new(config: &InspectorConfig) -> Self {
        let hub = Arc::new(SocketHub::new(config.channel_capacity));
        let registry = Arc::new(ConnectionRegistry::new());
        let inspector = Inspector::new(registry, hub.clone())
            .with_request_timeout(config.request_timeout);
        Self {
            inspector: Arc::new(inspector),
            hub,
        }
    }
}

/// Build the inspector router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/agent-card", post(handle_agent_card))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({"status": "ok", "connections": state.hub.len().await}))
}

#[derive(Debug, Default, Deserialize)]
struct AgentCardRequest {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    sid: Option<String>,
}

/// `POST /agent-card` with `{url, sid}`.
async fn handle_agent_card(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let request: AgentCardRequest = serde_json::from_value(payload.clone()).unwrap_or_default();

    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(url), Some(sid)) = (non_empty(request.url), non_empty(request.sid)) else {
        return error_response(StatusCode::BAD_REQUEST, "Agent URL and SID are required.");
    };

    let normalizer = state.inspector.normalizer();
    normalizer
        .emit_debug(
            &sid,
            DebugKind::Request,
            json!({"endpoint": "/agent-card", "payload": payload}),
            HTTP_AGENT_CARD_ID,
        )
        .await;

    let (status, body) = match fetch_and_validate(&state, &sid, &url, forwardable(&headers)).await {
        Ok(body) => (StatusCode::OK, body),
        Err(e) if e.is_network() => {
            warn!(%sid, %url, error = %e, "agent card fetch failed");
            (
                StatusCode::BAD_GATEWAY,
                json!({"error": format!("Failed to connect to agent: {e}")}),
            )
        }
        Err(e) => {
            error!(%sid, %url, error = %e, "agent card request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": format!("An internal server error occurred: {e}")}),
            )
        }
    };

    normalizer
        .emit_debug(
            &sid,
            DebugKind::Response,
            json!({"status": status.as_u16(), "payload": body}),
            HTTP_AGENT_CARD_ID,
        )
        .await;

    (status, Json(body)).into_response()
}

async fn fetch_and_validate(
    state: &AppState,
    sid: &str,
    url: &str,
    headers: HashMap<String, String>,
) -> Result<Value, InspectorError> {
    let resolver = CardResolver::from_url(url)?;
    let handle = HttpHandle::new(headers, state.inspector.request_timeout())?;
    let fetched = resolver.fetch(&handle).await;
    close_quietly(sid, &handle);

    let card = strip_nulls(fetched?.raw);
    let validation_errors = validate_agent_card(&card);
    Ok(json!({"card": card, "validation_errors": validation_errors}))
}

fn forwardable(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter(|(name, _)| !HOP_HEADERS.contains(&name.as_str()))
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}
