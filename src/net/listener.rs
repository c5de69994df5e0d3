//! Backend TCP listener with a cancellable accept loop.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections and spawn one handler task each
//! - Optionally bound concurrent handlers via semaphore
//! - Stop promptly even while parked in accept
//!
//! # State Machine
//! ```text
//! Stopped --start()--> Listening --stop()--> Stopping --(loop exits)--> Stopped
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::config::ListenerConfig;
use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};
use crate::net::connection::ConnectionTracker;
use crate::net::handler::{handle_connection, ConnectionOutcome, HandlerError, HandlerSettings};
use crate::observability::metrics;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    /// `start` was called on a listener that is not stopped.
    #[error("listener is not stopped (state: {0:?})")]
    AlreadyRunning(ListenerState),
}

/// Lifecycle state of a [`BackendListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Stopped,
    Listening,
    Stopping,
}

/// A backend server: one accept loop answering the line protocol.
///
/// Dropping a listening instance releases its accept loop as well, since the
/// loop also exits once its shutdown sender is gone.
#[derive(Debug)]
pub struct BackendListener {
    config: ListenerConfig,
    state: ListenerState,
    local_addr: Option<SocketAddr>,
    shutdown: Option<Shutdown>,
    accept_task: Option<JoinHandle<()>>,
    tracker: ConnectionTracker,
}

impl BackendListener {
    pub fn new(config: ListenerConfig) -> Self {
        let tracker = ConnectionTracker::new(config.port);
        Self {
            config,
            state: ListenerState::Stopped,
            local_addr: None,
            shutdown: None,
            accept_task: None,
            tracker,
        }
    }

    /// Bind and start accepting connections in a background task.
    ///
    /// Returns the bound address. A bind failure leaves the listener stopped.
    pub async fn start(&mut self) -> Result<SocketAddr, ListenerError> {
        if self.state != ListenerState::Stopped {
            return Err(ListenerError::AlreadyRunning(self.state));
        }

        let address = self.config.bind_address();
        let bind_err = |source| ListenerError::Bind {
            address: address.clone(),
            source,
        };
        let listener = TcpListener::bind(&address).await.map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        let shutdown = Shutdown::new();
        let tracker = ConnectionTracker::new(local_addr.port());
        let accept_loop = AcceptLoop {
            listener,
            settings: Arc::new(HandlerSettings {
                port: local_addr.port(),
                verbose: self.config.verbose,
                read_timeout: self.config.read_timeout(),
                max_line_bytes: self.config.max_line_bytes,
            }),
            limit: self.config.max_connections.map(|n| Arc::new(Semaphore::new(n))),
            tracker: tracker.clone(),
            signal: shutdown.subscribe(),
        };

        tracing::info!(
            address = %local_addr,
            verbose = self.config.verbose,
            max_connections = ?self.config.max_connections,
            "Listener bound"
        );

        self.accept_task = Some(tokio::spawn(accept_loop.run()));
        self.shutdown = Some(shutdown);
        self.tracker = tracker;
        self.local_addr = Some(local_addr);
        self.state = ListenerState::Listening;
        Ok(local_addr)
    }

    /// Stop accepting and wait for the accept loop to exit.
    ///
    /// In-flight handlers keep running to completion. No-op when already stopped.
    pub async fn stop(&mut self) {
        let Some(task) = self.accept_task.take() else {
            self.state = ListenerState::Stopped;
            return;
        };

        self.state = ListenerState::Stopping;
        if let Some(shutdown) = &self.shutdown {
            shutdown.trigger();
        }
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Accept loop terminated abnormally");
        }
        self.shutdown = None;
        self.state = ListenerState::Stopped;

        tracing::info!(
            address = ?self.local_addr,
            in_flight = self.tracker.active_count(),
            "Listener stopped"
        );
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Address of the current (or most recent) bind.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Number of handlers currently running.
    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Wait for in-flight handlers to finish, up to `timeout`.
    pub async fn wait_for_idle(&self, timeout: Duration) -> bool {
        self.tracker.wait_for_idle(timeout).await
    }
}

/// Everything the spawned accept task owns.
struct AcceptLoop {
    listener: TcpListener,
    settings: Arc<HandlerSettings>,
    limit: Option<Arc<Semaphore>>,
    tracker: ConnectionTracker,
    signal: ShutdownSignal,
}

impl AcceptLoop {
    async fn run(mut self) {
        loop {
            // Acquire permit first (backpressure); shutdown still wins.
            let permit = match &self.limit {
                Some(limit) => tokio::select! {
                    biased;
                    _ = self.signal.recv() => break,
                    permit = limit.clone().acquire_owned() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_) => break,
                    },
                },
                None => None,
            };

            let accepted = tokio::select! {
                biased;
                _ = self.signal.recv() => break,
                res = self.listener.accept() => res,
            };

            match accepted {
                Ok((stream, peer)) => self.dispatch(stream, peer, permit),
                Err(e) => {
                    tracing::warn!(port = self.settings.port, error = %e, "Failed to accept connection");
                    // Avoid spinning when out of file descriptors.
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
        tracing::debug!(port = self.settings.port, "Accept loop exited");
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr, permit: Option<OwnedSemaphorePermit>) {
        let guard = self.tracker.track();
        let settings = Arc::clone(&self.settings);
        metrics::record_connection(settings.port);

        let span = tracing::debug_span!("connection", id = %guard.id(), peer = %peer, port = settings.port);
        tokio::spawn(
            async move {
                let _guard = guard;
                let _permit = permit;
                match handle_connection(stream, &settings).await {
                    Ok(ConnectionOutcome::Replied { .. }) => tracing::debug!("Request answered"),
                    Ok(ConnectionOutcome::ClosedEarly) => {
                        tracing::debug!("Peer closed without sending a request")
                    }
                    Err(e) => {
                        metrics::record_connection_error(settings.port, e.kind());
                        match e {
                            HandlerError::Io(_) => tracing::warn!(error = %e, "Error handling client"),
                            _ => tracing::debug!(error = %e, "Dropping connection"),
                        }
                    }
                }
            }
            .instrument(span),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ephemeral() -> ListenerConfig {
        ListenerConfig::new(0, false)
    }

    #[tokio::test]
    async fn start_and_stop_transitions() {
        let mut listener = BackendListener::new(ephemeral());
        assert_eq!(listener.state(), ListenerState::Stopped);

        let addr = listener.start().await.unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(listener.state(), ListenerState::Listening);
        assert_eq!(listener.local_addr(), Some(addr));

        listener.stop().await;
        assert_eq!(listener.state(), ListenerState::Stopped);
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let mut listener = BackendListener::new(ephemeral());
        listener.start().await.unwrap();

        let err = listener.start().await.unwrap_err();
        assert!(matches!(err, ListenerError::AlreadyRunning(ListenerState::Listening)));
        listener.stop().await;
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let mut listener = BackendListener::new(ephemeral());
        listener.stop().await;
        assert_eq!(listener.state(), ListenerState::Stopped);

        listener.start().await.unwrap();
        listener.stop().await;
        listener.stop().await;
        assert_eq!(listener.state(), ListenerState::Stopped);
    }

    #[tokio::test]
    async fn restart_after_stop_binds_again() {
        let mut listener = BackendListener::new(ephemeral());
        listener.start().await.unwrap();
        listener.stop().await;

        listener.start().await.unwrap();
        assert_eq!(listener.state(), ListenerState::Listening);
        listener.stop().await;
    }
}
