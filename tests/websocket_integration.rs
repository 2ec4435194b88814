//! End-to-end tests using a real WebSocket client.

mod common;

use std::time::Duration;

use a2a_inspector::config::InspectorConfig;
use a2a_inspector::inspector::{router, AppState};
use common::*;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Start an inspector on a random port.
async fn start_inspector() -> (String, AppState) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(&InspectorConfig::default());
    let app = router(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("ws://{addr}/ws"), state)
}

/// Connect and return the stream plus the connection id from `connected`.
async fn connect(url: &str) -> (WsStream, String) {
    let (mut ws, _) = connect_async(url).await.unwrap();
    let hello = read_json(&mut ws).await;
    assert_eq!(hello["event"], "connected");
    let sid = hello["data"]["sid"].as_str().unwrap().to_string();
    (ws, sid)
}

/// Read the next text frame as JSON.
async fn read_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timeout waiting for frame")
            .expect("stream closed")
            .expect("ws error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn send_json(ws: &mut WsStream, frame: Value) {
    ws.send(Message::text(frame.to_string())).await.unwrap();
}

#[tokio::test]
async fn connect_initialize_and_send() {
    let agent = start_mock_agent(MockAgentOptions::default()).await;
    let (url, state) = start_inspector().await;
    let (mut ws, sid) = connect(&url).await;

    send_json(
        &mut ws,
        json!({"event": "initialize_client", "ackId": 1, "data": {"url": agent.base_url, "customHeaders": {}}}),
    )
    .await;

    // Card fetch telemetry arrives before the ack.
    assert_eq!(read_json(&mut ws).await["data"]["type"], "request");
    assert_eq!(read_json(&mut ws).await["data"]["type"], "response");
    let ack = read_json(&mut ws).await;
    assert_eq!(
        ack,
        json!({"event": "ack", "ackId": 1, "data": {"status": "success"}})
    );
    assert!(state.inspector.registry().get(&sid).await.is_some());

    send_json(
        &mut ws,
        json!({"event": "send_message", "data": {"message": "hi", "id": "req-1"}}),
    )
    .await;

    let request_log = read_json(&mut ws).await;
    assert_eq!(request_log["event"], "debug_log");
    assert_eq!(request_log["data"]["type"], "request");
    assert_eq!(request_log["data"]["id"], "req-1");

    let response_log = read_json(&mut ws).await;
    assert_eq!(response_log["data"]["type"], "response");

    let response = read_json(&mut ws).await;
    assert_eq!(response["event"], "agent_response");
    assert_eq!(response["data"]["kind"], "task");
    assert_eq!(response["data"]["status"]["state"], "completed");
}

#[tokio::test]
async fn streaming_chunks_arrive_in_order() {
    let agent = start_mock_agent(MockAgentOptions {
        streaming: true,
        ..Default::default()
    })
    .await;
    let (url, _state) = start_inspector().await;
    let (mut ws, _sid) = connect(&url).await;

    send_json(
        &mut ws,
        json!({"event": "initialize_client", "ackId": 1, "data": {"url": agent.base_url}}),
    )
    .await;
    for _ in 0..3 {
        read_json(&mut ws).await;
    }

    send_json(
        &mut ws,
        json!({"event": "send_message", "data": {"message": "go", "id": "req-1"}}),
    )
    .await;

    let mut frames = Vec::new();
    for _ in 0..(1 + 2 * 3) {
        frames.push(read_json(&mut ws).await);
    }
    let states: Vec<_> = frames
        .iter()
        .filter(|f| f["event"] == "agent_response")
        .map(|f| f["data"]["status"]["state"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(states, vec!["submitted", "working", "completed"]);
}

#[tokio::test]
async fn replies_without_ack_become_events() {
    let (url, _state) = start_inspector().await;
    let (mut ws, _sid) = connect(&url).await;

    send_json(&mut ws, json!({"event": "initialize_client", "data": {}})).await;
    let reply = read_json(&mut ws).await;
    assert_eq!(
        reply,
        json!({"event": "client_initialized", "data": {"status": "error", "message": "Agent URL is required."}})
    );

    send_json(
        &mut ws,
        json!({"event": "send_message", "data": {"message": "hi", "id": "req-1"}}),
    )
    .await;
    let reply = read_json(&mut ws).await;
    assert_eq!(
        reply,
        json!({"event": "agent_response", "data": {"error": "Client not initialized.", "id": "req-1"}})
    );
}

#[tokio::test]
async fn bad_frames_keep_the_connection_open() {
    let (url, _state) = start_inspector().await;
    let (mut ws, _sid) = connect(&url).await;

    ws.send(Message::text("not json")).await.unwrap();
    send_json(&mut ws, json!({"event": "explode", "ackId": 9, "data": {}})).await;

    let reply = read_json(&mut ws).await;
    assert_eq!(reply["event"], "ack");
    assert_eq!(reply["ackId"], 9);
    assert!(reply["data"]["error"].as_str().unwrap().contains("explode"));

    send_json(&mut ws, json!({"event": "send_message", "ackId": 10, "data": {"message": "hi", "id": "x"}})).await;
    let reply = read_json(&mut ws).await;
    assert_eq!(reply["ackId"], 10);
    assert_eq!(reply["data"]["error"], "Client not initialized.");
}

#[tokio::test]
async fn disconnect_tears_down_session() {
    let agent = start_mock_agent(MockAgentOptions::default()).await;
    let (url, state) = start_inspector().await;
    let (mut ws, sid) = connect(&url).await;

    send_json(
        &mut ws,
        json!({"event": "initialize_client", "ackId": 1, "data": {"url": agent.base_url}}),
    )
    .await;
    for _ in 0..3 {
        read_json(&mut ws).await;
    }
    let session = state.inspector.registry().get(&sid).await.unwrap();
    assert_eq!(state.hub.len().await, 1);

    ws.close(None).await.unwrap();

    let deadline = tokio::time::Instant::now() + TIMEOUT;
    while state.inspector.registry().get(&sid).await.is_some() {
        assert!(tokio::time::Instant::now() < deadline, "session not torn down");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(session.handle.is_closed());

    while !state.hub.is_empty().await {
        assert!(tokio::time::Instant::now() < deadline, "connection not unregistered");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn connections_are_isolated() {
    let agent = start_mock_agent(MockAgentOptions::default()).await;
    let (url, _state) = start_inspector().await;
    let (mut first, _) = connect(&url).await;
    let (mut second, _) = connect(&url).await;

    send_json(
        &mut first,
        json!({"event": "initialize_client", "ackId": 1, "data": {"url": agent.base_url}}),
    )
    .await;
    for _ in 0..3 {
        read_json(&mut first).await;
    }

    send_json(
        &mut second,
        json!({"event": "send_message", "ackId": 2, "data": {"message": "hi", "id": "r"}}),
    )
    .await;
    let reply = read_json(&mut second).await;
    assert_eq!(reply["data"]["error"], "Client not initialized.");
}
