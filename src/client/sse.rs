//! Server-Sent Events (SSE) handling for `message/stream` responses.
//!
//! Each event's `data:` lines, joined with `\n`, form one response chunk.
//! Agents either send bare events or full JSON-RPC responses; both become
//! [`AgentResponse`] values, and a JSON-RPC error chunk is an ordinary
//! [`AgentResponse::Error`] rather than a stream failure.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::Stream;
use tokio::sync::mpsc;

use crate::error::{A2AError, A2AResult};
use crate::types::{AgentResponse, JsonRpcResponse};

/// A stream of agent response chunks parsed from an SSE body.
///
/// Parsing runs on a background task feeding a bounded channel; dropping the
/// stream aborts that task.
pub struct SseStream {
    receiver: mpsc::Receiver<A2AResult<AgentResponse>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl std::fmt::Debug for SseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseStream").finish_non_exhaustive()
    }
}

impl SseStream {
    pub(crate) fn from_response(response: reqwest::Response) -> Self {
        let (tx, rx) = mpsc::channel(64);

        let task = tokio::spawn(async move {
            if let Err(e) = parse_sse_stream(response, &tx).await {
                let _ = tx.send(Err(e)).await;
            }
        });

        Self {
            receiver: rx,
            task: Some(task),
        }
    }

    /// A stream holding exactly one chunk, for agents that answer a
    /// streaming call with a plain JSON-RPC body.
    pub(crate) fn once(item: A2AResult<AgentResponse>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.try_send(item);
        Self {
            receiver: rx,
            task: None,
        }
    }
}

impl Stream for SseStream {
    type Item = A2AResult<AgentResponse>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for SseStream {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

async fn parse_sse_stream(
    response: reqwest::Response,
    tx: &mpsc::Sender<A2AResult<AgentResponse>>,
) -> A2AResult<()> {
    use futures::StreamExt;

    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();
    let mut event = EventBuffer::default();

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| A2AError::Transport(format!("error reading SSE stream: {e}")))?;
        buffer.extend_from_slice(&chunk);

        // Split on raw bytes so a multi-byte character spanning two chunks survives.
        while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = buffer.drain(..=pos).collect();
            let line = decode_line(&raw)?;
            if let Some(response) = event.push_line(line.trim_end_matches(['\r', '\n']))? {
                if tx.send(Ok(response)).await.is_err() {
                    return Ok(());
                }
            }
        }
    }

    if !buffer.is_empty() {
        let line = decode_line(&buffer)?;
        if let Some(response) = event.push_line(line.trim_end_matches(['\r', '\n']))? {
            if tx.send(Ok(response)).await.is_err() {
                return Ok(());
            }
        }
    }
    // A body that ends without the closing blank line still completes its event.
    if let Some(response) = event.dispatch()? {
        let _ = tx.send(Ok(response)).await;
    }

    Ok(())
}

fn decode_line(raw: &[u8]) -> A2AResult<&str> {
    std::str::from_utf8(raw)
        .map_err(|e| A2AError::Transport(format!("invalid UTF-8 in SSE stream: {e}")))
}

/// `data:` lines of the event being read. A blank line ends the event.
#[derive(Debug, Default)]
struct EventBuffer {
    data: Vec<String>,
}

impl EventBuffer {
    /// Feed one line (without its terminator). Returns the decoded chunk when
    /// the line completes an event that carried data.
    fn push_line(&mut self, line: &str) -> A2AResult<Option<AgentResponse>> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return Ok(None);
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        Ok(None)
    }

    /// Decode the buffered data lines, joined with `\n`, and reset.
    fn dispatch(&mut self) -> A2AResult<Option<AgentResponse>> {
        if self.data.is_empty() {
            return Ok(None);
        }
        let data = self.data.join("\n");
        self.data.clear();
        parse_event_data(&data)
    }
}

/// Decode one event's data. Empty data and `[DONE]` produce no chunk.
fn parse_event_data(data: &str) -> A2AResult<Option<AgentResponse>> {
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        A2AError::InvalidJson(format!("failed to parse SSE event data: {e} (data: {data})"))
    })?;

    if value.get("jsonrpc").is_none() {
        return Ok(Some(AgentResponse::success(None, value)));
    }

    let response: JsonRpcResponse = serde_json::from_value(value).map_err(|e| {
        A2AError::InvalidJson(format!("malformed JSON-RPC SSE event: {e} (data: {data})"))
    })?;
    AgentResponse::try_from(response).map(Some)
}
