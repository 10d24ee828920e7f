//! Buy One Get One Free
//!
//! Every `quantity_required`th unit of a product is free. With the canonical
//! `quantity_required` of 2 this is buy-one-get-one-free; 3 gives
//! buy-two-get-one-free, and so on.

use std::fmt;

use rusty_money::{Money, iso::Currency};

use crate::offers::{OfferError, require_positive, times_units, unit_price_minor};

/// Buy N, get one free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyOneGetOneFree {
    quantity_required: usize,
}

impl BuyOneGetOneFree {
    /// Create a new offer where every `quantity_required`th unit is free.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::InvalidConfiguration`] if `quantity_required` is 0.
    pub fn new(quantity_required: usize) -> Result<Self, OfferError> {
        require_positive("quantity_required", quantity_required)?;

        Ok(Self { quantity_required })
    }

    /// Return the basket size at which one unit becomes free.
    pub fn quantity_required(&self) -> usize {
        self.quantity_required
    }

    /// Return how many of `quantity` units are free.
    pub fn items_free(&self, quantity: usize) -> usize {
        if quantity < self.quantity_required {
            return 0;
        }

        quantity / self.quantity_required
    }

    /// Compute the reduction: one unit price per free unit.
    ///
    /// # Errors
    ///
    /// Returns an [`OfferError`] if the price is negative or the reduction overflows.
    pub fn compute_reduction<'a>(
        &self,
        unit_price: &Money<'a, Currency>,
        quantity: usize,
    ) -> Result<Money<'a, Currency>, OfferError> {
        let price = unit_price_minor(unit_price)?;
        let reduction = times_units(price, self.items_free(quantity))?;

        Ok(Money::from_minor(reduction, unit_price.currency()))
    }
}

impl Default for BuyOneGetOneFree {
    fn default() -> Self {
        Self {
            quantity_required: 2,
        }
    }
}

impl fmt::Display for BuyOneGetOneFree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quantity_required {
            1 => f.write_str("Every item free"),
            2 => f.write_str("Buy one get one free"),
            n => write!(f, "Buy {}, 1 free", n - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn zero_quantity_required_is_rejected() {
        assert!(matches!(
            BuyOneGetOneFree::new(0),
            Err(OfferError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn default_is_every_second_item() {
        assert_eq!(BuyOneGetOneFree::default().quantity_required(), 2);
    }

    #[test]
    fn fruit_tea_reductions() -> TestResult {
        let offer = BuyOneGetOneFree::new(2)?;
        let price = Money::from_minor(311, GBP);

        assert_eq!(offer.compute_reduction(&price, 0)?, Money::from_minor(0, GBP));
        assert_eq!(offer.compute_reduction(&price, 1)?, Money::from_minor(0, GBP));
        assert_eq!(offer.compute_reduction(&price, 2)?, Money::from_minor(311, GBP));
        assert_eq!(offer.compute_reduction(&price, 3)?, Money::from_minor(311, GBP));
        assert_eq!(offer.compute_reduction(&price, 4)?, Money::from_minor(622, GBP));

        Ok(())
    }

    #[test]
    fn buy_two_get_one_free() -> TestResult {
        let offer = BuyOneGetOneFree::new(3)?;

        assert_eq!(offer.items_free(2), 0);
        assert_eq!(offer.items_free(3), 1);
        assert_eq!(offer.items_free(5), 1);
        assert_eq!(offer.items_free(6), 2);
        assert_eq!(offer.to_string(), "Buy 2, 1 free");

        Ok(())
    }

    #[test]
    fn reduction_keeps_currency() -> TestResult {
        let offer = BuyOneGetOneFree::default();
        let reduction = offer.compute_reduction(&Money::from_minor(100, GBP), 2)?;

        assert_eq!(reduction.currency(), GBP);

        Ok(())
    }
}
