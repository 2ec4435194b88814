//! Shared test utilities for integration tests.
#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use a2a_inspector::client::{AgentClient, HttpHandle, ResponseStream};
use a2a_inspector::error::A2AResult;
use a2a_inspector::inspector::events::OutboundEvent;
use a2a_inspector::inspector::{ConnectionRegistry, Emitter, Inspector, Session};
use a2a_inspector::types::{AgentCard, AgentResponse, JsonRpcRequest};
use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};

// ============================================================================
// Mock A2A agent (real HTTP server)
// ============================================================================

/// How the mock agent behaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAgentOptions {
    /// Advertise `capabilities.streaming = true`.
    pub streaming: bool,
    /// Serve the card only at the legacy `/.well-known/agent.json`.
    pub legacy_card_only: bool,
    /// Answer `message/stream` with a plain JSON-RPC error body.
    pub json_stream_reply: bool,
    /// Pretty-print SSE payloads so each event spans several `data:` lines.
    pub multiline_events: bool,
}

/// A request the mock agent received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    base_url: String,
    options: MockAgentOptions,
    seen: Arc<Mutex<Vec<Recorded>>>,
}

/// A running mock agent.
pub struct MockAgent {
    pub base_url: String,
    pub seen: Arc<Mutex<Vec<Recorded>>>,
    pub handle: tokio::task::JoinHandle<()>,
}

impl MockAgent {
    pub fn requests(&self) -> Vec<Recorded> {
        self.seen.lock().unwrap().clone()
    }
}

/// Card JSON the mock agent serves.
pub fn agent_card_json(base_url: &str, streaming: bool) -> Value {
    json!({
        "name": "Test Agent",
        "description": "An agent for testing",
        "url": format!("{base_url}/a2a"),
        "version": "1.0.0",
        "capabilities": {"streaming": streaming, "pushNotifications": null},
        "defaultInputModes": ["text/plain"],
        "defaultOutputModes": ["text/plain"],
        "skills": [{"id": "echo", "name": "Echo", "description": "Echoes", "tags": ["test"]}]
    })
}

/// Start a mock agent on a random port.
pub async fn start_mock_agent(options: MockAgentOptions) -> MockAgent {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let state = MockState {
        base_url: base_url.clone(),
        options,
        seen: seen.clone(),
    };
    let app = Router::new()
        .route("/.well-known/agent-card.json", get(serve_card))
        .route("/.well-known/agent.json", get(serve_legacy_card))
        .route("/custom/card.json", get(serve_card))
        .route("/a2a", post(serve_jsonrpc))
        .with_state(state);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Brief wait for the server to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    MockAgent {
        base_url,
        seen,
        handle,
    }
}

fn record(state: &MockState, path: &str, headers: HeaderMap, body: Value) {
    state.seen.lock().unwrap().push(Recorded {
        path: path.to_string(),
        headers,
        body,
    });
}

async fn serve_card(State(state): State<MockState>, headers: HeaderMap) -> Response {
    record(&state, "card", headers, Value::Null);
    if state.options.legacy_card_only {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(agent_card_json(&state.base_url, state.options.streaming)).into_response()
}

async fn serve_legacy_card(State(state): State<MockState>, headers: HeaderMap) -> Response {
    record(&state, "legacy-card", headers, Value::Null);
    Json(agent_card_json(&state.base_url, state.options.streaming)).into_response()
}

/// `message/send` answers with a completed task; `message/stream` with a
/// task followed by two status updates. Text `"fail"` yields a JSON-RPC
/// error instead. See [`MockAgentOptions`] for the stream variants.
async fn serve_jsonrpc(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    record(&state, "a2a", headers, request.clone());

    let id = request["id"].clone();
    let text = request["params"]["message"]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let failing = text == "fail";

    match request["method"].as_str() {
        Some("message/send") => {
            let body = if failing {
                json!({"jsonrpc": "2.0", "id": id, "error": {"code": -32000, "message": "Agent failed"}})
            } else {
                json!({"jsonrpc": "2.0", "id": id, "result": task_json("task-1", "completed")})
            };
            Json(body).into_response()
        }
        Some("message/stream") if state.options.json_stream_reply => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32004, "message": "Streaming is not supported"}
        }))
        .into_response(),
        Some("message/stream") => {
            let chunks: Vec<Value> = if failing {
                vec![json!({"jsonrpc": "2.0", "id": id, "error": {"code": -32000, "message": "Agent failed"}})]
            } else {
                vec![
                    json!({"jsonrpc": "2.0", "id": id, "result": task_json("task-1", "submitted")}),
                    json!({"jsonrpc": "2.0", "id": id, "result": status_update_json("task-1", "working")}),
                    json!({"jsonrpc": "2.0", "id": id, "result": status_update_json("task-1", "completed")}),
                ]
            };
            let multiline = state.options.multiline_events;
            let events = chunks.into_iter().map(move |chunk| {
                let data = if multiline {
                    serde_json::to_string_pretty(&chunk).unwrap()
                } else {
                    chunk.to_string()
                };
                Ok::<_, Infallible>(Event::default().data(data))
            });
            Sse::new(futures::stream::iter(events)).into_response()
        }
        _ => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32601, "message": "Method not found"}
        }))
        .into_response(),
    }
}

pub fn task_json(id: &str, state: &str) -> Value {
    json!({
        "kind": "task",
        "id": id,
        "contextId": "ctx-1",
        "status": {"state": state, "message": null}
    })
}

pub fn status_update_json(task_id: &str, state: &str) -> Value {
    json!({
        "kind": "status-update",
        "taskId": task_id,
        "contextId": "ctx-1",
        "status": {"state": state},
        "final": state == "completed"
    })
}

/// A port nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

// ============================================================================
// Recording emitter
// ============================================================================

/// Emitter that keeps every event for later inspection.
#[derive(Default)]
pub struct RecordingEmitter {
    events: tokio::sync::Mutex<Vec<(String, OutboundEvent)>>,
}

impl RecordingEmitter {
    pub async fn events(&self) -> Vec<(String, OutboundEvent)> {
        self.events.lock().await.clone()
    }

    /// Events sent to `conn_id`, in order.
    pub async fn events_for(&self, conn_id: &str) -> Vec<OutboundEvent> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|(to, _)| to == conn_id)
            .map(|(_, event)| event.clone())
            .collect()
    }
}

#[async_trait]
impl Emitter for RecordingEmitter {
    async fn emit(&self, to: &str, event: OutboundEvent) {
        self.events.lock().await.push((to.to_string(), event));
    }
}

/// An inspector wired to a fresh registry and a recording emitter.
pub fn recording_inspector() -> (Arc<Inspector>, Arc<RecordingEmitter>) {
    let emitter = Arc::new(RecordingEmitter::default());
    let inspector = Inspector::new(Arc::new(ConnectionRegistry::new()), emitter.clone());
    (Arc::new(inspector), emitter)
}

/// `(event, debug type)` pairs, for asserting ordering.
pub fn shape(events: &[OutboundEvent]) -> Vec<(String, Option<String>)> {
    events
        .iter()
        .map(|e| {
            let kind = e.data["type"].as_str().map(str::to_string);
            let kind = if e.event == "debug_log" { kind } else { None };
            (e.event.clone(), kind)
        })
        .collect()
}

// ============================================================================
// Scripted agent client
// ============================================================================

/// What a [`ScriptedClient`] answers with.
pub enum Script {
    Single(A2AResult<AgentResponse>),
    Stream(Vec<A2AResult<AgentResponse>>),
    /// The streaming call itself fails.
    StreamFails(a2a_inspector::error::A2AError),
}

/// In-process [`AgentClient`] replaying a fixed script.
pub struct ScriptedClient {
    script: Mutex<Option<Script>>,
    pub requests: Mutex<Vec<JsonRpcRequest>>,
}

impl ScriptedClient {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Some(script)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<JsonRpcRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn take(&self, request: JsonRpcRequest) -> Script {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .take()
            .expect("scripted client called more than once")
    }
}

#[async_trait]
impl AgentClient for ScriptedClient {
    async fn send_message(&self, request: JsonRpcRequest) -> A2AResult<AgentResponse> {
        match self.take(request) {
            Script::Single(response) => response,
            _ => panic!("expected a single-shot call"),
        }
    }

    async fn send_message_streaming(&self, request: JsonRpcRequest) -> A2AResult<ResponseStream> {
        match self.take(request) {
            Script::Stream(chunks) => {
                let stream = async_stream::stream! {
                    for chunk in chunks {
                        tokio::task::yield_now().await;
                        yield chunk;
                    }
                };
                Ok(Box::pin(stream))
            }
            Script::StreamFails(e) => Err(e),
            Script::Single(_) => panic!("expected a streaming call"),
        }
    }
}

/// Store a session for `conn_id` backed by `client`.
pub async fn insert_session(
    inspector: &Inspector,
    conn_id: &str,
    client: Arc<dyn AgentClient>,
    streaming: bool,
) {
    let card: AgentCard =
        serde_json::from_value(agent_card_json("http://agent.test", streaming)).unwrap();
    let handle = Arc::new(HttpHandle::new(Default::default(), None).unwrap());
    inspector
        .registry()
        .put(conn_id, Session::new(handle, client, card))
        .await;
}
