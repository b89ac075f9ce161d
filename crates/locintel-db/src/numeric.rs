//! Conversions between `NUMERIC` columns and the `f64` values the domain uses.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Lossy `NUMERIC` to `f64`. Values stored in this schema always fit.
#[must_use]
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// `f64` to a `Decimal` rounded to `dp` places, half away from zero.
///
/// Starts from the shortest decimal form of `value`, matching the
/// `float8 -> numeric` cast, so `60.005` rounds to `60.01`.
/// Returns `None` for NaN and infinities.
#[must_use]
pub fn f64_to_decimal(value: f64, dp: u32) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
}

/// Round `value` to the precision of a `NUMERIC(_, dp)` column, half away
/// from zero. Non-finite values pass through unchanged.
#[must_use]
pub fn round_f64(value: f64, dp: u32) -> f64 {
    f64_to_decimal(value, dp).map_or(value, decimal_to_f64)
}
