//! Money calculation utilities using rust_decimal for precision
//!
//! Monetary values are stored and serialized as `f64` but every
//! computation goes through `Decimal` and is rounded half-up to two
//! places before storage.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert an `f64` into `Decimal` for arithmetic.
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert back to `f64`, rounded to two places half-up.
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Sum a slice of `f64` amounts without accumulating float error.
pub fn sum(amounts: impl IntoIterator<Item = f64>) -> f64 {
    let total: Decimal = amounts.into_iter().map(to_decimal).sum();
    to_f64(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_avoids_float_drift() {
        // 0.1 + 0.2 != 0.3 in plain f64
        assert_eq!(sum([0.1, 0.2]), 0.3);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(to_f64(to_decimal(10.005)), 10.01);
        assert_eq!(to_f64(to_decimal(10.004)), 10.0);
    }

    #[test]
    fn negative_amounts_survive_round_trip() {
        assert_eq!(sum([100.0, -30.0, -70.0]), 0.0);
        assert_eq!(sum([50.0, -80.0]), -30.0);
    }
}
