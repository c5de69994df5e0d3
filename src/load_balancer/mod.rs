//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Caller asks for a backend
//!     → pool.rs (take the pool lock)
//!     → round_robin.rs (scan from cursor for next healthy entry)
//!     → backend.rs (registry entries + health flags)
//!     → Return descriptor, or None when nothing is healthy
//!
//! External monitor / tests
//!     → pool.rs set_healthy (same lock)
//! ```
//!
//! # Design Decisions
//! - Strict cyclic order in registration order, no weights
//! - Cursor and health flags share one lock; every call is linearizable
//! - Unhealthy backends excluded from selection
//! - No built-in probing; health only changes through `set_healthy`

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::{BackendDescriptor, PoolError};
pub use pool::BackendPool;
