//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject duplicate backends and unusable ports
//! - Validate value ranges (timeouts > 0, limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::BalancerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("backends[{index}]: host must not be empty")]
    EmptyBackendHost { index: usize },
    #[error("backends[{index}]: port 0 is not routable")]
    ZeroBackendPort { index: usize },
    #[error("backends[{index}]: duplicate backend {host}:{port}")]
    DuplicateBackend { index: usize, host: String, port: u16 },
    #[error("server.host must not be empty")]
    EmptyServerHost,
    #[error("server.ports contains {0} more than once")]
    DuplicatePort(u16),
    #[error("server.read_timeout_ms must be greater than 0")]
    ZeroReadTimeout,
    #[error("server.max_line_bytes must be greater than 0")]
    ZeroLineLimit,
    #[error("server.max_connections must be greater than 0 when set")]
    ZeroConnectionLimit,
    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for (index, backend) in config.backends.iter().enumerate() {
        if backend.host.trim().is_empty() {
            errors.push(ValidationError::EmptyBackendHost { index });
        }
        if backend.port == 0 {
            errors.push(ValidationError::ZeroBackendPort { index });
        }
        if !seen.insert((backend.host.as_str(), backend.port)) {
            errors.push(ValidationError::DuplicateBackend {
                index,
                host: backend.host.clone(),
                port: backend.port,
            });
        }
    }

    let server = &config.server;
    if server.host.trim().is_empty() {
        errors.push(ValidationError::EmptyServerHost);
    }
    let mut ports = HashSet::new();
    for &port in &server.ports {
        // Port 0 is allowed: each such listener gets its own ephemeral port.
        if port != 0 && !ports.insert(port) {
            errors.push(ValidationError::DuplicatePort(port));
        }
    }
    if server.read_timeout_ms == 0 {
        errors.push(ValidationError::ZeroReadTimeout);
    }
    if server.max_line_bytes == 0 {
        errors.push(ValidationError::ZeroLineLimit);
    }
    if server.max_connections == Some(0) {
        errors.push(ValidationError::ZeroConnectionLimit);
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
