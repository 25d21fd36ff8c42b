//! Infrastructure layer

pub mod persistence;

pub use persistence::{InMemoryFormRepository, InMemoryResponseRepository};
