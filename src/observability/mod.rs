//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pool, listeners and handlers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout log stream
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (backend, port, connection_id) on every event
//! - Metrics are cheap and disabled by default

pub mod logging;
pub mod metrics;
