//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, optional connection limit)
//!     → connection.rs (connection id, in-flight tracking)
//!     → handler.rs (read one line, write one reply, close)
//!
//! Listener States:
//!     Stopped → Listening → Stopping → Stopped
//! ```
//!
//! # Design Decisions
//! - One task per connection; the accept loop never waits on a handler
//! - Accept is selected against a shutdown channel, no self-connect needed
//! - Stopping does not cancel in-flight handlers

pub mod connection;
pub mod handler;
pub mod listener;

pub use listener::{BackendListener, ListenerError, ListenerState};
