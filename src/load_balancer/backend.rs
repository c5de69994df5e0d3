//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server by its (host, port) identity
//! - Keep the ordered registry of backends and their health flags
//! - Reject duplicate registrations and unknown health updates

use std::collections::HashMap;
use std::fmt;

/// Error type for registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Health update for a backend that was never registered.
    #[error("unknown backend {0}")]
    UnknownBackend(BackendDescriptor),
    /// The backend is already part of the registry.
    #[error("backend {0} is already registered")]
    DuplicateBackend(BackendDescriptor),
}

/// Immutable identity of a routable backend server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendDescriptor {
    pub host: String,
    pub port: u16,
}

impl BackendDescriptor {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl std::str::FromStr for BackendDescriptor {
    type Err = String;

    /// Parse `host:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected host:port, got {:?}", s))?;
        if host.is_empty() {
            return Err(format!("missing host in {:?}", s));
        }
        let port = port
            .parse::<u16>()
            .map_err(|e| format!("invalid port in {:?}: {}", s, e))?;
        Ok(Self::new(host, port))
    }
}

/// A registered backend together with its health flag.
#[derive(Debug, Clone)]
pub struct BackendEntry {
    pub descriptor: BackendDescriptor,
    pub healthy: bool,
}

/// Ordered backend registry.
///
/// Insertion order is the round-robin order. `index` maps every descriptor in
/// `entries` to its position, so both always hold the same key set.
/// Not synchronized on its own; [`BackendPool`](super::pool::BackendPool)
/// wraps it together with the selection cursor.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<BackendEntry>,
    index: HashMap<BackendDescriptor, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend, initially healthy.
    pub fn register(&mut self, descriptor: BackendDescriptor) -> Result<(), PoolError> {
        if self.index.contains_key(&descriptor) {
            return Err(PoolError::DuplicateBackend(descriptor));
        }
        self.index.insert(descriptor.clone(), self.entries.len());
        self.entries.push(BackendEntry {
            descriptor,
            healthy: true,
        });
        Ok(())
    }

    /// Overwrite the health flag of a registered backend.
    pub fn set_healthy(&mut self, descriptor: &BackendDescriptor, healthy: bool) -> Result<(), PoolError> {
        match self.index.get(descriptor) {
            Some(&i) => {
                self.entries[i].healthy = healthy;
                Ok(())
            }
            None => Err(PoolError::UnknownBackend(descriptor.clone())),
        }
    }

    /// Unknown backends report `false`.
    pub fn is_healthy(&self, descriptor: &BackendDescriptor) -> bool {
        self.index
            .get(descriptor)
            .map(|&i| self.entries[i].healthy)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&BackendEntry> {
        self.entries.get(i)
    }

    pub fn entries(&self) -> &[BackendEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(port: u16) -> BackendDescriptor {
        BackendDescriptor::new("localhost", port)
    }

    #[test]
    fn register_defaults_to_healthy() {
        let mut registry = Registry::new();
        registry.register(local(5001)).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.is_healthy(&local(5001)));
        assert_eq!(registry.get(0).unwrap().descriptor, local(5001));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = Registry::new();
        registry.register(local(5001)).unwrap();
        registry.set_healthy(&local(5001), false).unwrap();

        let err = registry.register(local(5001)).unwrap_err();
        assert_eq!(err, PoolError::DuplicateBackend(local(5001)));
        assert_eq!(registry.len(), 1);
        // Rejected registration must not reset health.
        assert!(!registry.is_healthy(&local(5001)));
    }

    #[test]
    fn same_port_on_other_host_is_distinct() {
        let mut registry = Registry::new();
        registry.register(local(5001)).unwrap();
        registry.register(BackendDescriptor::new("10.0.0.2", 5001)).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_backend_health_update() {
        let mut registry = Registry::new();
        registry.register(local(5001)).unwrap();

        let err = registry.set_healthy(&local(9999), false).unwrap_err();
        assert_eq!(err, PoolError::UnknownBackend(local(9999)));
        assert!(!registry.is_healthy(&local(9999)));
        assert!(registry.is_healthy(&local(5001)));
    }

    #[test]
    fn descriptor_parse_and_display() {
        let d: BackendDescriptor = "127.0.0.1:5002".parse().unwrap();
        assert_eq!(d, BackendDescriptor::new("127.0.0.1", 5002));
        assert_eq!(d.to_string(), "127.0.0.1:5002");

        assert!("no-port".parse::<BackendDescriptor>().is_err());
        assert!(":5000".parse::<BackendDescriptor>().is_err());
        assert!("host:99999".parse::<BackendDescriptor>().is_err());
    }
}
