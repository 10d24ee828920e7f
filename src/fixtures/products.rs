//! Product Fixtures

use std::sync::Arc;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    offers::Offer,
    products::{Product, ProductCode, whole_minor_units},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product code -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product price (e.g., "3.11 GBP")
    pub price: String,

    /// Id of the offer applied to this product
    #[serde(default)]
    pub offer: Option<String>,
}

impl ProductFixture {
    /// Convert to a [`Product`], resolving the offer id against loaded offers.
    ///
    /// # Errors
    ///
    /// Returns an error if the price cannot be parsed or the offer id is unknown.
    pub fn try_into_product<'a>(
        self,
        code: impl Into<ProductCode>,
        offers: &FxHashMap<String, Arc<Offer>>,
    ) -> Result<Product<'a>, FixtureError> {
        let (minor_units, currency) = parse_price(&self.price)?;
        let product = Product::new(self.name, code, Money::from_minor(minor_units, currency));

        let Some(offer_key) = self.offer else {
            return Ok(product);
        };

        let offer = offers
            .get(&offer_key)
            .ok_or(FixtureError::OfferNotFound(offer_key))?;

        Ok(product.with_offer(Arc::clone(offer)))
    }
}

/// Parse price string (e.g., "3.11 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal or is finer than the currency's
/// minor unit, or if the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    // Prices finer than the currency's minor unit are rejected, not rounded
    let minor_units = whole_minor_units(&Money::from_decimal(amount, currency))
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}
