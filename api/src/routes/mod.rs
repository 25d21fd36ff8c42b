//! API Routes

pub mod analytics;
pub mod forms;
pub mod health;
pub mod responses;
