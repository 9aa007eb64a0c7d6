//! Mathematical utility functions

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// Fraction to percent: `0.0076` -> `0.76`.
pub fn to_percent(fraction: Decimal) -> Decimal {
    fraction * dec!(100)
}

/// Percent to fraction: `0.5` -> `0.005`.
pub fn from_percent(percent: Decimal) -> Decimal {
    percent / dec!(100)
}

/// `numerator / denominator`, or zero when the denominator is not positive
/// or the quotient is out of range.
pub fn safe_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
    }
}
