//! Booking module - availability, allocation and group search
//!
//! The write path is `allocator` (lock → recheck → insert); the read
//! path is `availability`; `groups` seats parties that need two or more
//! rooms. `locks` provides the per-property date-range lock that
//! serializes contending allocation attempts.

pub mod allocator;
pub mod availability;
pub mod groups;
pub mod locks;

#[cfg(test)]
mod tests;
