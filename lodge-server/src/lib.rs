//! Lodge Server — room inventory & reservation allocation engine
//!
//! The engine decides, under concurrent access, whether a stay request
//! can be satisfied, locks the contended inventory window, and drives
//! reservations and rooms through coupled lifecycles. All status writes
//! go through the finite state machine, which appends an audit row in
//! the same unit of work.

pub mod booking;
pub mod core;
pub mod db;
pub mod events;
pub mod fsm;
pub mod lifecycle;
pub mod pricing;
pub mod utils;

#[cfg(test)]
pub(crate) mod testutil;

// Re-exports
pub use crate::booking::allocator::Allocator;
pub use crate::core::config::Config;
pub use crate::core::error::{EngineError, EngineResult};
pub use crate::core::state::ServerState;
pub use crate::events::{EventBus, LifecycleEvent};
pub use crate::lifecycle::LifecycleService;
