//! Fixed-precision monetary values.
//!
//! Asset values are held as [`Decimal`] in memory and persisted as integer
//! cents, so values with at most two fractional digits round-trip exactly.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::error::TradebookError;

/// Fractional digits kept in storage.
pub const SCALE: u32 = 2;

/// Largest storable magnitude: 13 integer digits plus 2 fractional digits.
pub const MAX_CENTS: i64 = 999_999_999_999_999;

/// Round to the storage scale, half away from zero.
pub fn normalize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn to_cents(value: Decimal) -> Result<i64, TradebookError> {
    let cents = normalize(value)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|c| c.to_i64());
    match cents {
        Some(c) if c.abs() <= MAX_CENTS => Ok(c),
        _ => Err(TradebookError::InvalidValue {
            value,
            reason: "value exceeds 13 integer digits".to_string(),
        }),
    }
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, SCALE)
}
