//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer
//! and its backend servers. All types derive Serde traits for deserialization
//! from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BalancerConfig {
    /// Backend server settings (ports to serve, protocol limits).
    pub server: ServerConfig,

    /// Backend pool in round-robin order.
    pub backends: Vec<BackendConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Settings shared by every backend listener the daemon starts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind (e.g., "127.0.0.1").
    pub host: String,

    /// One listener is started per port.
    pub ports: Vec<u16>,

    /// Log every received request line.
    pub verbose: bool,

    /// Deadline for reading the request line, in milliseconds.
    pub read_timeout_ms: u64,

    /// Longest accepted request line, in bytes.
    pub max_line_bytes: usize,

    /// Cap on concurrently served connections per listener (unset = unbounded).
    pub max_connections: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            ports: vec![5001],
            verbose: false,
            read_timeout_ms: 5_000,
            max_line_bytes: 64 * 1024,
            max_connections: None,
        }
    }
}

impl ServerConfig {
    /// Listener settings for one of the configured ports.
    pub fn listener(&self, port: u16) -> ListenerConfig {
        ListenerConfig {
            host: self.host.clone(),
            port,
            verbose: self.verbose,
            read_timeout_ms: self.read_timeout_ms,
            max_line_bytes: self.max_line_bytes,
            max_connections: self.max_connections,
        }
    }
}

/// Settings for a single backend listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// Port to bind; 0 picks an ephemeral port.
    pub port: u16,

    /// Log every received request line.
    pub verbose: bool,

    /// Deadline for reading the request line, in milliseconds.
    pub read_timeout_ms: u64,

    /// Longest accepted request line, in bytes.
    pub max_line_bytes: usize,

    /// Cap on concurrently served connections (unset = unbounded).
    pub max_connections: Option<usize>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        ServerConfig::default().listener(5001)
    }
}

impl ListenerConfig {
    /// Listener on `port` with default limits.
    pub fn new(port: u16, verbose: bool) -> Self {
        Self {
            port,
            verbose,
            ..Self::default()
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Backend entry in the round-robin pool.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BackendConfig {
    /// Backend host name or address.
    pub host: String,

    /// Backend port.
    pub port: u16,

    /// Initial health flag (default: true).
    #[serde(default = "default_healthy")]
    pub healthy: bool,
}

fn default_healthy() -> bool {
    true
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
