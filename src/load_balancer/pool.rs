//! Backend pool management.
//!
//! # Responsibilities
//! - Own the backend registry and the round-robin cursor
//! - Serialize selection and health updates behind one lock
//! - Build pools from configuration

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::BackendConfig;
use crate::load_balancer::{
    backend::{BackendDescriptor, PoolError, Registry},
    round_robin::RoundRobin,
};
use crate::observability::metrics;

#[derive(Debug, Default)]
struct PoolState {
    registry: Registry,
    selector: RoundRobin,
}

/// Health-aware round-robin pool.
///
/// Registry, health flags and cursor share a single mutex, so each public
/// call observes and leaves behind one consistent state. Share it via `Arc`.
#[derive(Debug, Default)]
pub struct BackendPool {
    state: Mutex<PoolState>,
}

impl BackendPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool from configuration.
    ///
    /// Duplicate entries are skipped with a warning; validation normally
    /// rejects them before this point.
    pub fn from_config(configs: &[BackendConfig]) -> Self {
        let pool = Self::new();
        for config in configs {
            let descriptor = BackendDescriptor::new(config.host.clone(), config.port);
            match pool.register(descriptor.clone()) {
                Ok(()) => {
                    if !config.healthy {
                        // Just registered, cannot be unknown.
                        let _ = pool.set_healthy(&descriptor, false);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Skipping backend entry"),
            }
        }
        pool
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // Every critical section leaves the registry consistent, so a
        // poisoned guard is still safe to use.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a backend at the end of the rotation, marked healthy.
    pub fn register(&self, descriptor: BackendDescriptor) -> Result<(), PoolError> {
        self.lock().registry.register(descriptor.clone())?;
        tracing::debug!(backend = %descriptor, "Backend registered");
        Ok(())
    }

    /// Set the health flag of a registered backend.
    pub fn set_healthy(&self, descriptor: &BackendDescriptor, healthy: bool) -> Result<(), PoolError> {
        let result = self.lock().registry.set_healthy(descriptor, healthy);
        match &result {
            Ok(()) => tracing::debug!(backend = %descriptor, healthy, "Backend health updated"),
            Err(e) => tracing::warn!(error = %e, "Ignoring health update"),
        }
        result
    }

    /// Current health flag; `false` for unknown backends.
    pub fn is_healthy(&self, descriptor: &BackendDescriptor) -> bool {
        self.lock().registry.is_healthy(descriptor)
    }

    pub fn len(&self) -> usize {
        self.lock().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().registry.is_empty()
    }

    /// Backend at position `i` in rotation order.
    pub fn get(&self, i: usize) -> Option<BackendDescriptor> {
        self.lock().registry.get(i).map(|e| e.descriptor.clone())
    }

    /// Select the next healthy backend in rotation order.
    ///
    /// `None` means no backend is currently healthy (or none is registered);
    /// callers decide how to reject the request.
    pub fn next_healthy(&self) -> Option<BackendDescriptor> {
        let selected = {
            let mut state = self.lock();
            let PoolState { registry, selector } = &mut *state;
            selector
                .next_index(registry.entries())
                .map(|i| registry.entries()[i].descriptor.clone())
        };

        match &selected {
            Some(backend) => {
                tracing::trace!(backend = %backend, "Backend selected");
                metrics::record_selection(true);
            }
            None => {
                tracing::debug!("No healthy backends available");
                metrics::record_selection(false);
            }
        }
        selected
    }

    /// Point-in-time copy of all backends and their health, in rotation order.
    ///
    /// For display only; it goes stale as soon as it is returned.
    pub fn snapshot(&self) -> Vec<(BackendDescriptor, bool)> {
        self.lock()
            .registry
            .entries()
            .iter()
            .map(|e| (e.descriptor.clone(), e.healthy))
            .collect()
    }
}
