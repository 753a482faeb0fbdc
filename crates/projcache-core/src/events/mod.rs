//! Cache lifecycle events.

pub mod handler;
pub mod types;
