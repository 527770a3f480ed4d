//! Per-property date-range locks
//!
//! The allocator must serialize concurrent booking attempts whose date
//! ranges overlap on the same property, without blocking unrelated
//! dates or other properties. This registry grants an RAII guard for a
//! `(property, [in, out))` window; acquisition waits while any held
//! window overlaps, and dropping the guard wakes the waiters.
//!
//! Within one property, contenders are totally ordered by acquisition;
//! the loser re-checks availability under its own lock and fails cleanly
//! with a conflict instead of corrupting counts.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use shared::StayRange;
use tokio::sync::Notify;

struct HeldRange {
    ticket: u64,
    range: StayRange,
}

#[derive(Default)]
struct PropertySlot {
    held: Mutex<Vec<HeldRange>>,
    notify: Notify,
}

/// Registry of held date-range locks, one slot per property.
pub struct RangeLockManager {
    slots: DashMap<i64, Arc<PropertySlot>>,
    next_ticket: AtomicU64,
}

impl RangeLockManager {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Acquire an exclusive lock over `range` for the property. Waits
    /// while any overlapping range is held; disjoint ranges proceed
    /// concurrently.
    pub async fn acquire(&self, property_id: i64, range: StayRange) -> RangeLockGuard {
        let slot = self
            .slots
            .entry(property_id)
            .or_default()
            .clone();
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);

        loop {
            // Register for the wakeup before checking, so a release
            // between the check and the await is never missed.
            let notified = slot.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut held = slot.held.lock();
                if !held.iter().any(|h| h.range.overlaps(&range)) {
                    held.push(HeldRange { ticket, range });
                    return RangeLockGuard {
                        slot: Arc::clone(&slot),
                        ticket,
                    };
                }
            }

            notified.await;
        }
    }
}

impl Default for RangeLockManager {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII lock over one date range. Dropping releases the range and wakes
/// every waiter on the property.
pub struct RangeLockGuard {
    slot: Arc<PropertySlot>,
    ticket: u64,
}

impl Drop for RangeLockGuard {
    fn drop(&mut self) {
        let mut held = self.slot.held.lock();
        held.retain(|h| h.ticket != self.ticket);
        drop(held);
        self.slot.notify.notify_waiters();
    }
}
