//! Common utility functions for tax calculations.
//!
//! Shared rounding and clamping used by every calculator in this module.

use rust_decimal::{Decimal, RoundingStrategy};

/// Dong has no minor unit in practice.
pub const CURRENCY_DP: u32 = 0;

/// Rounds a value to whole dong using half-up rounding.
///
/// Values exactly halfway between two whole amounts round away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use pit_core::calculations::common::round_currency;
///
/// assert_eq!(round_currency(dec!(1234.4)), dec!(1234));
/// assert_eq!(round_currency(dec!(1234.5)), dec!(1235));
/// assert_eq!(round_currency(dec!(-1234.5)), dec!(-1235)); // Away from zero
/// ```
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps negative values to zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use pit_core::calculations::common::floor_at_zero;
///
/// assert_eq!(floor_at_zero(dec!(-5)), dec!(0));
/// assert_eq!(floor_at_zero(dec!(5)), dec!(5));
/// ```
pub fn floor_at_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
