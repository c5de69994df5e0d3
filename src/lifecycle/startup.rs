//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any bind error is fatal and stops what already started
//! - Listeners start in configured port order

use crate::config::ServerConfig;
use crate::net::listener::{BackendListener, ListenerError};

/// Start one listener per configured port.
pub async fn start_listeners(config: &ServerConfig) -> Result<Vec<BackendListener>, ListenerError> {
    let mut listeners = Vec::with_capacity(config.ports.len());

    for &port in &config.ports {
        let mut listener = BackendListener::new(config.listener(port));
        if let Err(e) = listener.start().await {
            tracing::error!(port, error = %e, "Listener failed to start");
            stop_listeners(&mut listeners).await;
            return Err(e);
        }
        listeners.push(listener);
    }

    tracing::info!(count = listeners.len(), "All listeners started");
    Ok(listeners)
}

/// Stop every listener, in order.
pub async fn stop_listeners(listeners: &mut [BackendListener]) {
    for listener in listeners.iter_mut() {
        listener.stop().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::ListenerState;

    #[tokio::test]
    async fn starts_one_listener_per_port() {
        let config = ServerConfig {
            ports: vec![0, 0],
            ..ServerConfig::default()
        };
        let mut listeners = start_listeners(&config).await.unwrap();
        assert_eq!(listeners.len(), 2);
        assert!(listeners.iter().all(|l| l.state() == ListenerState::Listening));

        stop_listeners(&mut listeners).await;
        assert!(listeners.iter().all(|l| l.state() == ListenerState::Stopped));
    }

    #[tokio::test]
    async fn bind_failure_aborts_startup() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let config = ServerConfig {
            ports: vec![0, port],
            ..ServerConfig::default()
        };
        let err = start_listeners(&config).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
    }
}
