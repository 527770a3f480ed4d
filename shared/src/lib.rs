//! Shared types for the Lodge platform
//!
//! Domain models, status enums and utility types used by the server
//! and by API consumers.

pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
pub use types::{Actor, StayRange};
