//! Threshold Percent Discount
//!
//! Once at least `quantity_required` units of a product are in the basket, every
//! unit (or every Nth unit, see `applies_to_every_n_items`) is discounted by a
//! percentage of its price. The threshold is not marginal: reaching it discounts
//! the whole quantity, not just the units above it.

use std::fmt;

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};

use crate::{
    discounts::{percent_of_minor, percent_points, validate_percent},
    offers::{OfferError, require_positive, times_units, unit_price_minor},
};

/// Percentage off each unit once a quantity threshold is met.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPercentDiscount {
    quantity_required: usize,
    discount: Percentage,
    applies_to_every_n_items: usize,
}

impl ThresholdPercentDiscount {
    /// Create a new threshold discount.
    ///
    /// `applies_to_every_n_items` of 1 discounts every unit; 2 discounts one unit
    /// per pair, and so on.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::InvalidConfiguration`] if `quantity_required` or
    /// `applies_to_every_n_items` is 0, or if `discount` is outside 0% to 100%.
    pub fn new(
        quantity_required: usize,
        discount: Percentage,
        applies_to_every_n_items: usize,
    ) -> Result<Self, OfferError> {
        require_positive("quantity_required", quantity_required)?;
        require_positive("applies_to_every_n_items", applies_to_every_n_items)?;

        validate_percent(&discount)
            .map_err(|err| OfferError::InvalidConfiguration(err.to_string()))?;

        Ok(Self {
            quantity_required,
            discount,
            applies_to_every_n_items,
        })
    }

    /// Return the minimum quantity that activates the discount.
    pub fn quantity_required(&self) -> usize {
        self.quantity_required
    }

    /// Return the discount percentage.
    pub fn discount(&self) -> &Percentage {
        &self.discount
    }

    /// Return the application divisor.
    pub fn applies_to_every_n_items(&self) -> usize {
        self.applies_to_every_n_items
    }

    /// Return how many of `quantity` units receive the discount.
    pub fn applicable_units(&self, quantity: usize) -> usize {
        if quantity < self.quantity_required {
            return 0;
        }

        quantity / self.applies_to_every_n_items
    }

    /// Return the discount for a single unit, truncated to whole minor units.
    ///
    /// # Errors
    ///
    /// Returns an [`OfferError`] if the price is negative or the percentage cannot
    /// be applied.
    pub fn discount_per_item<'a>(
        &self,
        unit_price: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, OfferError> {
        let price = unit_price_minor(unit_price)?;
        let discount = percent_of_minor(&self.discount, price)?;

        Ok(Money::from_minor(discount, unit_price.currency()))
    }

    /// Compute the reduction for `quantity` units.
    ///
    /// # Errors
    ///
    /// Returns an [`OfferError`] if the price is negative or the reduction overflows.
    pub fn compute_reduction<'a>(
        &self,
        unit_price: &Money<'a, Currency>,
        quantity: usize,
    ) -> Result<Money<'a, Currency>, OfferError> {
        let units = self.applicable_units(quantity);

        if units == 0 {
            return Ok(Money::from_minor(0, unit_price.currency()));
        }

        let per_item = percent_of_minor(&self.discount, unit_price_minor(unit_price)?)?;

        Ok(Money::from_minor(
            times_units(per_item, units)?,
            unit_price.currency(),
        ))
    }
}

impl fmt::Display for ThresholdPercentDiscount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% off when buying {} or more",
            percent_points(&self.discount),
            self.quantity_required
        )?;

        if self.applies_to_every_n_items > 1 {
            write!(f, ", every {} items", self.applies_to_every_n_items)?;
        }

        Ok(())
    }
}
