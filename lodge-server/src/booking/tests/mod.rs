//! Booking engine tests: availability counting, allocation under
//! contention, and group batches against a real (temporary) database.

use std::sync::Arc;

use crate::booking::allocator::Allocator;
use crate::booking::locks::RangeLockManager;
use crate::testutil::*;

mod test_availability;

pub(super) fn allocator(pool: &sqlx::SqlitePool) -> Allocator {
    Allocator::new(pool.clone(), Arc::new(RangeLockManager::new()))
}
