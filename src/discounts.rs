//! Discount utilities
//!
//! Percentage maths shared by the offer types. Rates are held as
//! [`Percentage`] fractions (`0.10` is 10%) and applied to minor units with
//! [`Decimal`] so no floating point ever touches a price.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Percentage is below 0% or above 100%.
    #[error("percentage {0} is outside the range 0% to 100%")]
    PercentOutOfRange(Decimal),
}

/// Build a percentage from whole percent points (e.g. `10` is 10%).
pub fn whole_percent(points: u32) -> Percentage {
    Percentage::from(Decimal::new(i64::from(points), 2))
}

/// Return the percentage as a fraction (`0.10` for 10%).
pub fn fraction_of(percent: &Percentage) -> Decimal {
    // decimal_percentage doesn't expose the underlying Decimal
    (*percent) * Decimal::ONE
}

/// Return the percentage as percent points (`10` for 10%), trailing zeros removed.
pub fn percent_points(percent: &Percentage) -> Decimal {
    (fraction_of(percent) * Decimal::ONE_HUNDRED).normalize()
}

/// Check a percentage lies within 0% and 100% inclusive.
///
/// # Errors
///
/// Returns [`DiscountError::PercentOutOfRange`] for anything outside the range.
pub fn validate_percent(percent: &Percentage) -> Result<(), DiscountError> {
    let fraction = fraction_of(percent);

    if fraction < Decimal::ZERO || fraction > Decimal::ONE {
        return Err(DiscountError::PercentOutOfRange(
            (fraction * Decimal::ONE_HUNDRED).normalize(),
        ));
    }

    Ok(())
}

/// Calculate a percentage of a minor unit amount, truncating toward zero.
///
/// Truncation means a discount never exceeds the exact percentage of the price,
/// so 10% of 311 is 31 rather than 31.1 rounded.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows or
/// cannot be represented in minor units.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    fraction_of(percent)
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::ToZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}
