//! Application layer
//!
//! Orchestrates use cases over the domain and the repositories.

pub mod commands;
pub mod dto;

pub use commands::{FormService, ResponseService};
pub use dto::*;
