//! Pricing contract
//!
//! The modifier pipeline (seasons, day-of-week, rate plans, promotions)
//! is an external collaborator; the engine consumes it as a pure
//! function through [`PricingProvider`]. [`BaseRatePricing`] is the
//! default implementation used when no modifier pipeline is wired in:
//! base price plus per-person surcharges, per night.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::StayRange;
use shared::models::RoomType;

use crate::utils::money;

/// Price of one night of a stay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightlyPrice {
    pub date: NaiveDate,
    pub final_price: f64,
}

/// Pure pricing collaborator. Implementations must be side-effect free;
/// the allocator calls this inside its critical section.
pub trait PricingProvider: Send + Sync {
    fn nightly_prices(
        &self,
        room_type: &RoomType,
        range: &StayRange,
        adults: i32,
        children: i32,
        promotion_code: Option<&str>,
    ) -> Vec<NightlyPrice>;
}

/// Sum of all nightly prices.
pub fn total(nightly: &[NightlyPrice]) -> f64 {
    money::sum(nightly.iter().map(|n| n.final_price))
}

/// Base-rate pricing: `base_price + extra_adult_fee × (adults − 1) +
/// extra_child_fee × children` for every night.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseRatePricing;

impl PricingProvider for BaseRatePricing {
    fn nightly_prices(
        &self,
        room_type: &RoomType,
        range: &StayRange,
        adults: i32,
        children: i32,
        _promotion_code: Option<&str>,
    ) -> Vec<NightlyPrice> {
        let nights = range.nights();
        if nights <= 0 {
            return Vec::new();
        }

        let extra_adults = (adults - 1).max(0);
        let per_night = money::to_decimal(room_type.base_price)
            + money::to_decimal(room_type.extra_adult_fee) * rust_decimal::Decimal::from(extra_adults)
            + money::to_decimal(room_type.extra_child_fee)
                * rust_decimal::Decimal::from(children.max(0));
        let final_price = money::to_f64(per_night);

        (0..nights)
            .map(|i| NightlyPrice {
                date: range.check_in + Days::new(i as u64),
                final_price,
            })
            .collect()
    }
}
