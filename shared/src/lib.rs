//! Shared types for the campus platform
//!
//! Common types used by the server and its clients: the broadcast bus
//! message envelope with its payloads, and the unified API response
//! structure.

pub mod message;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, EventType};
pub use response::ApiResponse;
