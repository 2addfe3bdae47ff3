//! Shared helpers for the feasibility worksheets.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up
/// rounding (midpoint away from zero), the standard financial convention.
///
/// ```
/// use rust_decimal_macros::dec;
/// use estudio_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}
