//! Core module - configuration, error taxonomy and server state

pub mod config;
pub mod error;
pub mod state;

pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use state::ServerState;
