//! API models for requests and responses

pub mod car;

// Re-export commonly used types
pub use car::*;
