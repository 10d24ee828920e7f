//! Offer Fixtures

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    offers::{BuyOneGetOneFree, Offer, ThresholdPercentDiscount},
};

/// Wrapper for offers in YAML
#[derive(Debug, Deserialize)]
pub struct OffersFixture {
    /// Map of offer id -> offer fixture
    pub offers: FxHashMap<String, OfferFixture>,
}

/// Offer fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OfferFixture {
    /// Buy one get one free
    BuyOneGetOneFree {
        /// Basket size at which one unit becomes free
        #[serde(default = "default_bogof_quantity")]
        quantity_required: usize,
    },

    /// Percentage off every unit once a quantity threshold is met
    ThresholdPercentDiscount {
        /// Minimum quantity to activate the discount
        quantity_required: usize,

        /// Discount (e.g., "10%" or "0.10")
        discount: String,

        /// Discount one unit in every N
        #[serde(default = "default_application_interval")]
        applies_to_every_n_items: usize,
    },
}

fn default_bogof_quantity() -> usize {
    2
}

fn default_application_interval() -> usize {
    1
}

impl OfferFixture {
    /// Convert to an [`Offer`].
    ///
    /// # Errors
    ///
    /// Returns an error if the discount cannot be parsed or the offer configuration
    /// is invalid.
    pub fn try_into_offer(self, key: &str) -> Result<Offer, FixtureError> {
        let offer = match self {
            OfferFixture::BuyOneGetOneFree { quantity_required } => {
                BuyOneGetOneFree::new(quantity_required).map(Offer::from)
            }
            OfferFixture::ThresholdPercentDiscount {
                quantity_required,
                discount,
                applies_to_every_n_items,
            } => ThresholdPercentDiscount::new(
                quantity_required,
                parse_percentage(&discount)?,
                applies_to_every_n_items,
            )
            .map(Offer::from),
        };

        offer.map_err(|err| FixtureError::InvalidOffer(key.to_string(), err))
    }
}

/// Parse percentage string (e.g., "10%" or "0.10") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "10%" for 10%
/// - Decimal format: "0.10" for 10%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a decimal.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / Decimal::ONE_HUNDRED))
    } else {
        let value = trimmed
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}
