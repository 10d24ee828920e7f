//! Fixtures
//!
//! Catalog configuration loaded from YAML. A fixture set named `shop` is made of
//! three files below the base path:
//!
//! - `offers/shop.yml`: offer id -> offer configuration
//! - `products/shop.yml`: product code -> name, price and optional offer id
//! - `baskets/shop.yml`: product codes in scan order
//!
//! Offers are loaded before products, so products can refer to them by id.

use std::{fs, path::PathBuf, sync::Arc};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::debug;

use crate::{
    checkout::{Checkout, CheckoutError},
    fixtures::{baskets::BasketFixture, offers::OffersFixture, products::ProductsFixture},
    offers::{Offer, OfferError},
    products::{Product, ProductCode},
};

pub mod baskets;
pub mod offers;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Offer not found
    #[error("Offer not found: {0}")]
    OfferNotFound(String),

    /// Offer configuration was rejected
    #[error("Invalid offer {0}: {1}")]
    InvalidOffer(String, #[source] OfferError),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Not enough items in the basket fixture
    #[error("Not enough items in fixture, available: {available}, requested: {requested}")]
    NotEnoughItems {
        /// Number of items defined in the fixture
        available: usize,
        /// Number of items requested
        requested: usize,
    },

    /// Scanning a fixture product failed
    #[error("Failed to scan basket: {0}")]
    Checkout(#[from] CheckoutError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Offers by id, shared with every product that refers to them
    offers: FxHashMap<String, Arc<Offer>>,

    /// Products by code
    products: FxHashMap<ProductCode, Product<'a>>,

    /// Basket contents in scan order
    basket: Vec<ProductCode>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            offers: FxHashMap::default(),
            products: FxHashMap::default(),
            basket: Vec::new(),
            currency: None,
        }
    }

    /// Load offers from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an offer is invalid.
    pub fn load_offers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("offers").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: OffersFixture = serde_norway::from_str(&contents)?;

        for (key, offer_fixture) in fixture.offers {
            let offer = offer_fixture.try_into_offer(&key)?;

            self.offers.insert(key, Arc::new(offer));
        }

        debug!(path = %file_path.display(), offers = self.offers.len(), "loaded offers");

        Ok(self)
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a product refers to
    /// an unknown offer, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (code, product_fixture) in fixture.products {
            let (_minor_units, currency) = products::parse_price(&product_fixture.price)?;

            // All products in a fixture share one currency
            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            let product: Product<'a> = product_fixture.try_into_product(code, &self.offers)?;

            self.products.insert(product.code.clone(), product);
        }

        debug!(path = %file_path.display(), products = self.products.len(), "loaded products");

        Ok(self)
    }

    /// Load a basket from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if referenced products don't exist.
    pub fn load_basket(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("baskets").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: BasketFixture = serde_norway::from_str(&contents)?;

        for code in fixture.items {
            if !self.products.contains_key(code.as_str()) {
                return Err(FixtureError::ProductNotFound(code));
            }

            self.basket.push(ProductCode::from(code));
        }

        debug!(path = %file_path.display(), items = self.basket.len(), "loaded basket");

        Ok(self)
    }

    /// Load a complete fixture set (offers, products and basket with the same name)
    /// from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Load offers, products and basket sharing one set name.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_offers(name)?
            .load_products(name)?
            .load_basket(name)
    }

    /// Get a product by its code
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, code: &str) -> Result<&Product<'a>, FixtureError> {
        self.products
            .get(code)
            .ok_or_else(|| FixtureError::ProductNotFound(code.to_string()))
    }

    /// Get an offer by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the offer is not found.
    pub fn offer(&self, key: &str) -> Result<&Arc<Offer>, FixtureError> {
        self.offers
            .get(key)
            .ok_or_else(|| FixtureError::OfferNotFound(key.to_string()))
    }

    /// Get all products
    pub fn products(&self) -> &FxHashMap<ProductCode, Product<'a>> {
        &self.products
    }

    /// Get the basket contents in scan order
    pub fn basket_codes(&self) -> &[ProductCode] {
        &self.basket
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Scan the first `n` basket items (all of them when `n` is `None`) into a new checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if more items are requested than the basket holds, or a scan fails.
    pub fn checkout(&self, n: Option<usize>) -> Result<Checkout<'a>, FixtureError> {
        if let Some(n) = n
            && n > self.basket.len()
        {
            return Err(FixtureError::NotEnoughItems {
                requested: n,
                available: self.basket.len(),
            });
        }

        self.checkout_for(
            self.basket
                .iter()
                .take(n.unwrap_or(self.basket.len()))
                .map(ProductCode::as_str),
        )
    }

    /// Scan the given product codes into a new checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if a code is unknown or a scan fails.
    pub fn checkout_for<I, S>(&self, codes: I) -> Result<Checkout<'a>, FixtureError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut checkout = Checkout::new(self.currency()?);

        for code in codes {
            checkout.scan(self.product(code.as_ref())?.clone())?;
        }

        Ok(checkout)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
