//! Forms domain
//!
//! Aggregates, value objects and the stateless validation and analytics services.

pub mod aggregates;
pub mod services;
pub mod value_objects;

pub use aggregates::*;
pub use services::*;
pub use value_objects::*;
