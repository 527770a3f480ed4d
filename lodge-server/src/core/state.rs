//! Server state - shared handles for all engine services
//!
//! `ServerState` owns the connection pool, the per-property range-lock
//! registry and the lifecycle event bus. It is `Clone` (all members are
//! cheap shared handles) and hands out the allocator and lifecycle
//! services pre-wired.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::booking::allocator::Allocator;
use crate::booking::locks::RangeLockManager;
use crate::core::Config;
use crate::core::error::EngineResult;
use crate::db::DbService;
use crate::events::EventBus;
use crate::lifecycle::LifecycleService;

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// In-process date-range lock registry (per property)
    pub locks: Arc<RangeLockManager>,
    /// Lifecycle event bus
    pub events: EventBus,
}

impl ServerState {
    /// Initialize state: open the database, apply migrations, build services.
    pub async fn initialize(config: Config) -> EngineResult<Self> {
        let db_path = config.database_path();
        let db = DbService::new(&db_path.to_string_lossy()).await?;
        Ok(Self::with_pool(config, db.pool))
    }

    /// Build state over an already-open pool (tests use this with a
    /// temporary database).
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        let events = EventBus::new(config.event_channel_capacity);
        Self {
            config,
            pool,
            locks: Arc::new(RangeLockManager::new()),
            events,
        }
    }

    /// Reservation allocator bound to this state.
    pub fn allocator(&self) -> Allocator {
        Allocator::new(self.pool.clone(), Arc::clone(&self.locks))
    }

    /// Lifecycle orchestrator bound to this state.
    pub fn lifecycle(&self) -> LifecycleService {
        LifecycleService::new(self.pool.clone(), self.events.clone())
    }
}
