//! Ports (hexagonal architecture)
//!
//! Inbound: the use cases the transport layer drives.
//! Outbound: the persistence the application services need.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
