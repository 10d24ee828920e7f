//! Offers
//!
//! Per-product promotional offers. Every offer answers one question: given the
//! unit price of a product and how many units of it are in the basket, how much
//! comes off? The set of offers is closed, so they are modelled as an enum and
//! dispatched with a `match`.

use std::fmt;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{discounts::DiscountError, products::whole_minor_units};

pub mod buy_one_get_one_free;
pub mod threshold_percent_discount;

pub use buy_one_get_one_free::BuyOneGetOneFree;
pub use threshold_percent_discount::ThresholdPercentDiscount;

/// Errors raised while building or evaluating an offer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OfferError {
    /// The offer parameters break an offer invariant.
    #[error("invalid offer configuration: {0}")]
    InvalidConfiguration(String),

    /// The unit price handed to the offer was negative.
    #[error("unit price must not be negative, got {0}")]
    NegativePrice(Decimal),

    /// The unit price is not a whole number of minor units.
    #[error("unit price {0} is not a whole number of minor units")]
    UnrepresentablePrice(Decimal),

    /// The reduction does not fit in minor units.
    #[error("reduction overflowed")]
    Overflow,

    /// Wrapped discount calculation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Offer
#[derive(Debug, Clone, PartialEq)]
pub enum Offer {
    /// Every `quantity_required`th unit is free
    BuyOneGetOneFree(BuyOneGetOneFree),

    /// Percentage off every unit once a quantity threshold is reached
    ThresholdPercentDiscount(ThresholdPercentDiscount),
}

impl Offer {
    /// Return the number of units needed before the offer does anything.
    pub fn quantity_required(&self) -> usize {
        match self {
            Offer::BuyOneGetOneFree(bogof) => bogof.quantity_required(),
            Offer::ThresholdPercentDiscount(discount) => discount.quantity_required(),
        }
    }

    /// Compute the reduction owed for `quantity` units at `unit_price` each.
    ///
    /// The reduction is never negative and never exceeds `unit_price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns an [`OfferError`] if the price is negative or the reduction
    /// cannot be represented in minor units.
    pub fn compute_reduction<'a>(
        &self,
        unit_price: &Money<'a, Currency>,
        quantity: usize,
    ) -> Result<Money<'a, Currency>, OfferError> {
        match self {
            Offer::BuyOneGetOneFree(bogof) => bogof.compute_reduction(unit_price, quantity),
            Offer::ThresholdPercentDiscount(discount) => {
                discount.compute_reduction(unit_price, quantity)
            }
        }
    }
}

impl From<BuyOneGetOneFree> for Offer {
    fn from(offer: BuyOneGetOneFree) -> Self {
        Offer::BuyOneGetOneFree(offer)
    }
}

impl From<ThresholdPercentDiscount> for Offer {
    fn from(offer: ThresholdPercentDiscount) -> Self {
        Offer::ThresholdPercentDiscount(offer)
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offer::BuyOneGetOneFree(bogof) => bogof.fmt(f),
            Offer::ThresholdPercentDiscount(discount) => discount.fmt(f),
        }
    }
}

/// Reject counts below one.
fn require_positive(name: &str, value: usize) -> Result<(), OfferError> {
    if value == 0 {
        return Err(OfferError::InvalidConfiguration(format!(
            "{name} must be at least 1"
        )));
    }

    Ok(())
}

/// Return the unit price in minor units, rejecting negative prices.
fn unit_price_minor(unit_price: &Money<'_, Currency>) -> Result<i64, OfferError> {
    let amount = *unit_price.amount();

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(OfferError::NegativePrice(amount));
    }

    whole_minor_units(unit_price).ok_or(OfferError::UnrepresentablePrice(amount))
}

/// Multiply a per-unit amount by a number of units.
fn times_units(minor: i64, units: usize) -> Result<i64, OfferError> {
    i64::try_from(units)
        .ok()
        .and_then(|units| minor.checked_mul(units))
        .ok_or(OfferError::Overflow)
}
