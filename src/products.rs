//! Products

use std::{borrow::Borrow, fmt, sync::Arc};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};

use crate::offers::Offer;

/// Product code, the identifier scanned units are aggregated by (e.g. `FR1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductCode(String);

impl ProductCode {
    /// Create a new product code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Return the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for ProductCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl Borrow<str> for ProductCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Product
///
/// The offer is shared with every other unit of the same code; the product only
/// holds a reference to it.
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name, for display only
    pub name: String,

    /// Product code
    pub code: ProductCode,

    /// Unit price
    pub price: Money<'a, Currency>,

    /// Offer applied to all units of this product code
    pub offer: Option<Arc<Offer>>,
}

impl<'a> Product<'a> {
    /// Create a new product without an offer.
    pub fn new(
        name: impl Into<String>,
        code: impl Into<ProductCode>,
        price: Money<'a, Currency>,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            price,
            offer: None,
        }
    }

    /// Attach an offer to the product.
    #[must_use]
    pub fn with_offer(mut self, offer: Arc<Offer>) -> Self {
        self.offer = Some(offer);
        self
    }

    /// Return the offer, if any.
    pub fn offer(&self) -> Option<&Offer> {
        self.offer.as_deref()
    }
}

/// Return a price as a whole number of minor units of its currency.
///
/// Returns `None` when the price is more precise than the currency's minor unit
/// (e.g. `£0.001`) or does not fit in an `i64`.
pub fn whole_minor_units(price: &Money<'_, Currency>) -> Option<i64> {
    let factor = 10_i64.checked_pow(price.currency().exponent)?;
    let minor = price.amount().checked_mul(Decimal::from(factor))?;

    if !minor.fract().is_zero() {
        return None;
    }

    minor.to_i64()
}
