//! Runtime configuration for the inspector server.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

/// Settings for one inspector process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Bound on each outbound call to an agent. `None` waits forever.
    pub request_timeout: Option<Duration>,
    /// Per-connection queue depth for inbound frames and outbound events.
    pub channel_capacity: usize,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            request_timeout: None,
            channel_capacity: 256,
        }
    }
}

impl InspectorConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Command-line interface of the `a2a-inspector` binary.
#[derive(Debug, Parser)]
#[command(name = "a2a-inspector", version, about = "Inspect and debug A2A agents")]
pub struct Cli {
    /// Interface to bind.
    #[arg(long, env = "A2A_INSPECTOR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "A2A_INSPECTOR_PORT", default_value_t = 5001)]
    pub port: u16,

    /// Timeout in seconds for calls to agents (unset: no timeout).
    #[arg(long, env = "A2A_INSPECTOR_REQUEST_TIMEOUT")]
    pub request_timeout_secs: Option<u64>,

    /// Log filter, e.g. `a2a_inspector=debug`. `RUST_LOG` takes precedence.
    #[arg(long, env = "A2A_INSPECTOR_LOG", default_value = "a2a_inspector=info")]
    pub log_level: String,
}

impl Cli {
    pub fn config(&self) -> InspectorConfig {
        InspectorConfig {
            host: self.host.clone(),
            port: self.port,
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            ..InspectorConfig::default()
        }
    }
}
