//! Well-known paths, method names and wire event names.

/// Card path used when the agent URL carries no path of its own.
pub const DEFAULT_AGENT_CARD_PATH: &str = "agent-card.json";

/// Directory the default card path is resolved under.
pub const WELL_KNOWN_PREFIX: &str = ".well-known/";

/// Pre-0.3 location of the agent card.
pub const LEGACY_AGENT_CARD_PATH: &str = ".well-known/agent.json";

/// Single-shot send.
pub const METHOD_MESSAGE_SEND: &str = "message/send";

/// Streaming send.
pub const METHOD_MESSAGE_STREAM: &str = "message/stream";

/// Output modes advertised on every outbound message.
pub const ACCEPTED_OUTPUT_MODES: [&str; 2] = ["text/plain", "video/mp4"];

/// Debug-log correlation id for session initialization.
pub const INITIALIZE_CLIENT_ID: &str = "initialize-client";

/// Debug-log correlation id for the one-shot card route.
pub const HTTP_AGENT_CARD_ID: &str = "http-agent-card";
