//! Decimal quantity arithmetic.
//!
//! Every economic value in the simulation is a [`Quantity`]: a 96-bit
//! fixed-point decimal with 28 significant digits. Long-running accumulation
//! (hundreds of thousands of ticks adding 0.01 at a time) never drifts the
//! way binary floating point would.
//!
//! All helpers here saturate instead of panicking. Nothing in the game can
//! legitimately approach `Decimal::MAX`, so saturation is unobservable in
//! practice and keeps the ledger panic-free.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// An arbitrary-precision, non-negative economic quantity.
pub type Quantity = Decimal;

/// Clamp a quantity to the non-negative range.
pub fn non_negative(value: Quantity) -> Quantity {
    value.max(Decimal::ZERO)
}

/// Raise `base` to a whole-number power with saturating multiplication.
///
/// `pow(b, 0)` is one for every base.
pub fn pow(base: Quantity, exponent: u32) -> Quantity {
    let mut result = Decimal::ONE;
    for _ in 0..exponent {
        result = result.saturating_mul(base);
    }
    result
}

/// Multiply a quantity by every factor in order.
pub fn scale(value: Quantity, factors: &[Quantity]) -> Quantity {
    factors
        .iter()
        .fold(value, |acc, factor| acc.saturating_mul(*factor))
}

/// Convert a head count into a quantity.
pub fn from_count(count: u32) -> Quantity {
    Decimal::from(count)
}

/// Build a quantity from a whole percentage (`percent(15)` is `0.15`).
pub fn percent(value: u32) -> Quantity {
    Decimal::new(i64::from(value), 2)
}

/// Floor a quantity to a whole number of heads.
///
/// Negative values floor to zero; values beyond `u32::MAX` saturate.
pub fn floor_count(value: Quantity) -> u32 {
    if value <= Decimal::ZERO {
        return 0;
    }
    value.floor().to_u32().unwrap_or(u32::MAX)
}

/// Divide, returning zero when the divisor is zero.
pub fn ratio(numerator: Quantity, denominator: Quantity) -> Quantity {
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}
