//! Health-aware round-robin load balancing and line-protocol backend servers.

pub mod client;
pub mod config;
pub mod lifecycle;
pub mod load_balancer;
pub mod net;
pub mod observability;

pub use config::schema::BalancerConfig;
pub use lifecycle::Shutdown;
pub use load_balancer::{BackendDescriptor, BackendPool};
pub use net::BackendListener;
