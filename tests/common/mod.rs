//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use round_robin_lb::config::ListenerConfig;
use round_robin_lb::{BackendDescriptor, BackendListener, BackendPool};

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Start a backend on an ephemeral localhost port.
pub async fn start_backend(config: ListenerConfig) -> (BackendListener, SocketAddr) {
    let mut listener = BackendListener::new(ListenerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        ..config
    });
    let addr = listener.start().await.expect("listener should bind");
    (listener, addr)
}

/// Pool of `127.0.0.1` backends in the given port order.
#[allow(dead_code)]
pub fn local_pool(ports: &[u16]) -> BackendPool {
    let pool = BackendPool::new();
    for &port in ports {
        pool.register(BackendDescriptor::new("127.0.0.1", port)).unwrap();
    }
    pool
}

/// Poll until `cond` holds or `TIMEOUT` passes.
#[allow(dead_code)]
pub async fn wait_until<F: Fn() -> bool>(cond: F) {
    tokio::time::timeout(TIMEOUT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
