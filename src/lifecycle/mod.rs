//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Start one listener per port
//!
//! Shutdown (shutdown.rs):
//!     Trigger → accept loops leave select → in-flight handlers finish
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → stop all listeners
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then listeners
//! - Shutdown has a grace period for in-flight handlers

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
