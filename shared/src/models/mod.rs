//! Data models
//!
//! Shared between lodge-server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod payment;
pub mod property;
pub mod reservation;
pub mod room;
pub mod room_type;
pub mod transition_log;

// Re-exports
pub use payment::*;
pub use property::*;
pub use reservation::*;
pub use room::*;
pub use room_type::*;
pub use transition_log::*;
