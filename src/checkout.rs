//! Checkout
//!
//! A checkout is the running state of one basket at one till. Products are scanned
//! one unit at a time; the checkout keeps a running subtotal and aggregates units by
//! product code so that each product's offer is evaluated once, against the full
//! quantity of that product, whenever a total is requested.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    offers::OfferError,
    products::{Product, ProductCode, whole_minor_units},
    receipt::{Receipt, ReceiptLine},
};

/// Errors related to scanning products or pricing the checkout.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// A product was scanned with a negative price (code, price).
    #[error("Product {0} has a negative price of {1}")]
    InvalidProduct(ProductCode, Decimal),

    /// A product price is not a whole number of minor units (code, price).
    #[error("Product {0} price {1} is not a whole number of minor units")]
    UnrepresentablePrice(ProductCode, Decimal),

    /// A product's currency differs from the checkout currency (code, product currency, checkout currency).
    #[error("Product {0} has currency {1}, but checkout has currency {2}")]
    CurrencyMismatch(ProductCode, &'static str, &'static str),

    /// An offer could not be evaluated for a product code.
    #[error("Offer for product {0} failed: {1}")]
    Offer(ProductCode, #[source] OfferError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// All units of one product code scanned so far.
#[derive(Debug, Clone)]
pub struct ScannedLine<'a> {
    product: Product<'a>,
    quantity: usize,
    subtotal: Money<'a, Currency>,
}

impl<'a> ScannedLine<'a> {
    /// Return the representative product (the first unit scanned for this code).
    pub fn product(&self) -> &Product<'a> {
        &self.product
    }

    /// Return the number of units scanned.
    pub fn quantity(&self) -> usize {
        self.quantity
    }

    /// Return the sum of the prices of every unit scanned for this code.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }
}

/// Reduction owed by one product code's offer.
#[derive(Debug, Clone, PartialEq)]
pub struct LineReduction<'a> {
    /// Product code the offer applied to
    pub code: ProductCode,

    /// Aggregate quantity the offer was evaluated with
    pub quantity: usize,

    /// Amount taken off
    pub reduction: Money<'a, Currency>,
}

/// Checkout
///
/// A checkout is owned by a single till session and mutated through `&mut self`;
/// concurrent tills each own their own checkout.
#[derive(Debug)]
pub struct Checkout<'a> {
    lines: Vec<ScannedLine<'a>>,
    positions: FxHashMap<ProductCode, usize>,
    subtotal: Money<'a, Currency>,
    units: usize,
    currency: &'static Currency,
}

impl<'a> Checkout<'a> {
    /// Create a new, empty checkout priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Checkout {
            lines: Vec::new(),
            positions: FxHashMap::default(),
            subtotal: Money::from_minor(0, currency),
            units: 0,
            currency,
        }
    }

    /// Scan a single unit of a product.
    ///
    /// The first unit scanned for a code becomes the representative product for
    /// that code: its price and offer are used when evaluating the offer.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InvalidProduct`]: the product price is negative.
    /// - [`CheckoutError::CurrencyMismatch`]: the product is priced in another currency.
    /// - [`CheckoutError::UnrepresentablePrice`]: the price has sub-minor precision or
    ///   does not fit in minor units.
    /// - [`CheckoutError::Money`]: the subtotal could not be updated.
    pub fn scan(&mut self, product: Product<'a>) -> Result<(), CheckoutError> {
        let price = product.price;
        let amount = *price.amount();

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CheckoutError::InvalidProduct(product.code, amount));
        }

        if price.currency() != self.currency {
            return Err(CheckoutError::CurrencyMismatch(
                product.code,
                price.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if whole_minor_units(&price).is_none() {
            return Err(CheckoutError::UnrepresentablePrice(product.code, amount));
        }

        self.subtotal = self.subtotal.add(price)?;
        self.units += 1;

        if let Some(line) = self
            .positions
            .get(&product.code)
            .and_then(|&idx| self.lines.get_mut(idx))
        {
            line.quantity += 1;
            line.subtotal = line.subtotal.add(price)?;

            debug!(code = %product.code, quantity = line.quantity, %price, "scanned");
        } else {
            debug!(code = %product.code, quantity = 1, %price, "scanned");

            self.positions.insert(product.code.clone(), self.lines.len());
            self.lines.push(ScannedLine {
                product,
                quantity: 1,
                subtotal: price,
            });
        }

        Ok(())
    }

    /// Scan every product in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`CheckoutError`] raised by [`Checkout::scan`].
    pub fn scan_all(
        &mut self,
        products: impl IntoIterator<Item = Product<'a>>,
    ) -> Result<(), CheckoutError> {
        products
            .into_iter()
            .try_for_each(|product| self.scan(product))
    }

    /// Sum of the prices of every scanned unit.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Get the number of units scanned.
    pub fn len(&self) -> usize {
        self.units
    }

    /// Check if nothing has been scanned.
    pub fn is_empty(&self) -> bool {
        self.units == 0
    }

    /// Get the currency of the checkout.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Scanned lines, one per product code, in first-scan order.
    pub fn lines(&self) -> &[ScannedLine<'a>] {
        &self.lines
    }

    /// Number of units scanned per product code.
    pub fn quantities(&self) -> FxHashMap<ProductCode, usize> {
        self.lines
            .iter()
            .map(|line| (line.product.code.clone(), line.quantity))
            .collect()
    }

    /// Number of units scanned for a single product code.
    pub fn quantity(&self, code: &str) -> usize {
        self.positions
            .get(code)
            .and_then(|&idx| self.lines.get(idx))
            .map_or(0, |line| line.quantity)
    }

    /// One representative product per scanned code, in first-scan order.
    pub fn distinct_products(&self) -> impl Iterator<Item = &Product<'a>> {
        self.lines.iter().map(|line| &line.product)
    }

    /// Evaluate each product code's offer once against that code's total quantity.
    ///
    /// Codes without an offer are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Offer`] if an offer cannot be evaluated.
    pub fn reductions(&self) -> Result<SmallVec<[LineReduction<'a>; 8]>, CheckoutError> {
        self.lines
            .iter()
            .filter_map(|line| line.product.offer().map(|offer| (line, offer)))
            .map(|(line, offer)| {
                let code = &line.product.code;
                let reduction = offer
                    .compute_reduction(&line.product.price, line.quantity)
                    .map_err(|err| CheckoutError::Offer(code.clone(), err))?;

                trace!(%code, quantity = line.quantity, %offer, %reduction, "offer evaluated");

                Ok(LineReduction {
                    code: code.clone(),
                    quantity: line.quantity,
                    reduction,
                })
            })
            .collect()
    }

    /// Total reduction owed to all offers.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if an offer fails or the sum cannot be computed.
    pub fn calculate_discounts(&self) -> Result<Money<'a, Currency>, CheckoutError> {
        let discounts = self.reductions()?.into_iter().try_fold(
            Money::from_minor(0, self.currency),
            |acc, line| acc.add(line.reduction),
        )?;

        Ok(discounts)
    }

    /// Amount payable: subtotal less all offer reductions.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the discounts cannot be computed.
    pub fn total(&self) -> Result<Money<'a, Currency>, CheckoutError> {
        let discounts = self.calculate_discounts()?;
        let total = self.subtotal.sub(discounts)?;

        debug!(subtotal = %self.subtotal, %discounts, %total, "priced checkout");

        Ok(total)
    }

    /// Build a receipt with one line per scanned product code.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the discounts cannot be computed.
    pub fn receipt(&self) -> Result<Receipt<'a>, CheckoutError> {
        let reductions: FxHashMap<ProductCode, Money<'a, Currency>> = self
            .reductions()?
            .into_iter()
            .map(|line| (line.code, line.reduction))
            .collect();

        let lines = self
            .lines
            .iter()
            .map(|line| ReceiptLine {
                code: line.product.code.clone(),
                name: line.product.name.clone(),
                quantity: line.quantity,
                unit_price: line.product.price,
                subtotal: line.subtotal,
                offer: line.product.offer().map(ToString::to_string),
                reduction: reductions
                    .get(&line.product.code)
                    .copied()
                    .unwrap_or_else(|| Money::from_minor(0, self.currency)),
            })
            .collect();

        let discounts = reductions.values().try_fold(
            Money::from_minor(0, self.currency),
            |acc, reduction| acc.add(*reduction),
        )?;

        Ok(Receipt::new(
            lines,
            self.subtotal,
            discounts,
            self.subtotal.sub(discounts)?,
            self.currency,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::{
        discounts::whole_percent,
        offers::{BuyOneGetOneFree, Offer, ThresholdPercentDiscount},
    };

    use super::*;

    fn fruit_tea<'a>() -> Result<Product<'a>, OfferError> {
        let bogof = Arc::new(Offer::from(BuyOneGetOneFree::new(2)?));

        Ok(Product::new("Fruit tea", "FR1", Money::from_minor(311, GBP)).with_offer(bogof))
    }

    fn strawberries<'a>() -> Result<Product<'a>, OfferError> {
        let bulk = Arc::new(Offer::from(ThresholdPercentDiscount::new(
            3,
            whole_percent(10),
            1,
        )?));

        Ok(Product::new("Strawberries", "SR1", Money::from_minor(500, GBP)).with_offer(bulk))
    }

    fn coffee<'a>() -> Product<'a> {
        Product::new("Coffee", "CF1", Money::from_minor(1123, GBP))
    }

    #[test]
    fn new_checkout_is_empty() -> TestResult {
        let checkout = Checkout::new(GBP);

        assert!(checkout.is_empty());
        assert_eq!(checkout.len(), 0);
        assert_eq!(checkout.currency(), GBP);
        assert_eq!(checkout.subtotal(), Money::from_minor(0, GBP));
        assert_eq!(checkout.total()?, Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn scan_accumulates_subtotal_and_quantities() -> TestResult {
        let mut checkout = Checkout::new(GBP);
        let tea = fruit_tea()?;

        checkout.scan(tea.clone())?;
        checkout.scan(coffee())?;
        checkout.scan(tea)?;

        assert_eq!(checkout.len(), 3);
        assert_eq!(checkout.subtotal(), Money::from_minor(1745, GBP));
        assert_eq!(checkout.quantity("FR1"), 2);
        assert_eq!(checkout.quantity("CF1"), 1);
        assert_eq!(checkout.quantity("SR1"), 0);

        let quantities = checkout.quantities();

        assert_eq!(quantities.len(), 2);
        assert_eq!(quantities.get("FR1"), Some(&2));

        Ok(())
    }

    #[test]
    fn distinct_products_follow_first_scan_order() -> TestResult {
        let mut checkout = Checkout::new(GBP);
        let tea = fruit_tea()?;

        checkout.scan_all([coffee(), tea.clone(), coffee(), tea])?;

        let codes: Vec<&str> = checkout
            .distinct_products()
            .map(|product| product.code.as_str())
            .collect();

        assert_eq!(codes, ["CF1", "FR1"]);

        Ok(())
    }

    #[test]
    fn subtotal_never_decreases() -> TestResult {
        let mut checkout = Checkout::new(GBP);
        let basket = [fruit_tea()?, strawberries()?, coffee(), fruit_tea()?];
        let mut previous = checkout.subtotal().to_minor_units();

        for product in basket {
            checkout.scan(product)?;

            let current = checkout.subtotal().to_minor_units();
            assert!(current >= previous, "subtotal went from {previous} to {current}");
            previous = current;
        }

        Ok(())
    }

    #[test]
    fn fruit_tea_totals() -> TestResult {
        let mut checkout = Checkout::new(GBP);
        let tea = fruit_tea()?;

        for expected in [311, 311, 622, 622] {
            checkout.scan(tea.clone())?;

            assert_eq!(checkout.total()?, Money::from_minor(expected, GBP));
        }

        Ok(())
    }

    #[test]
    fn strawberry_totals() -> TestResult {
        let mut checkout = Checkout::new(GBP);
        let berries = strawberries()?;

        for expected in [500, 1000, 1350, 1800] {
            checkout.scan(berries.clone())?;

            assert_eq!(checkout.total()?, Money::from_minor(expected, GBP));
        }

        Ok(())
    }

    #[test]
    fn canonical_basket() -> TestResult {
        let mut checkout = Checkout::new(GBP);
        let tea = fruit_tea()?;
        let berries = strawberries()?;

        checkout.scan_all([
            tea.clone(),
            berries.clone(),
            tea,
            berries.clone(),
            coffee(),
            berries,
        ])?;

        assert_eq!(checkout.subtotal(), Money::from_minor(3245, GBP));
        assert_eq!(checkout.calculate_discounts()?, Money::from_minor(461, GBP));
        assert_eq!(checkout.total()?, Money::from_minor(2784, GBP));
        assert_eq!(checkout.total()?.to_string(), "£27.84");

        Ok(())
    }

    #[test]
    fn offer_is_evaluated_once_per_code() -> TestResult {
        let mut checkout = Checkout::new(GBP);
        let tea = fruit_tea()?;

        checkout.scan_all([tea.clone(), tea.clone(), tea.clone(), tea, coffee()])?;

        let reductions = checkout.reductions()?;

        // Per-unit evaluation would see a quantity of 1 and give nothing away;
        // evaluating the aggregate once per unit would give away four times too much.
        assert_eq!(
            reductions.as_slice(),
            [LineReduction {
                code: ProductCode::from("FR1"),
                quantity: 4,
                reduction: Money::from_minor(622, GBP),
            }]
        );

        Ok(())
    }

    #[test]
    fn products_without_offers_pay_full_price() -> TestResult {
        let mut checkout = Checkout::new(GBP);

        checkout.scan_all([coffee(), coffee()])?;

        assert!(checkout.reductions()?.is_empty());
        assert_eq!(checkout.total()?, checkout.subtotal());

        Ok(())
    }

    #[test]
    fn total_is_idempotent() -> TestResult {
        let mut checkout = Checkout::new(GBP);

        checkout.scan_all([fruit_tea()?, fruit_tea()?, strawberries()?])?;

        let first = checkout.total()?;
        let second = checkout.total()?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn first_scanned_product_represents_its_code() -> TestResult {
        let mut checkout = Checkout::new(GBP);
        let repriced = Product::new("Fruit tea", "FR1", Money::from_minor(400, GBP));

        checkout.scan_all([fruit_tea()?, repriced])?;

        assert_eq!(checkout.subtotal(), Money::from_minor(711, GBP));
        assert_eq!(
            checkout.calculate_discounts()?,
            Money::from_minor(311, GBP)
        );

        let line = checkout.lines().first().ok_or("expected a scanned line")?;

        assert_eq!(line.product().price, Money::from_minor(311, GBP));
        assert_eq!(line.subtotal(), Money::from_minor(711, GBP));

        Ok(())
    }

    #[test]
    fn scan_rejects_negative_price() {
        let mut checkout = Checkout::new(GBP);
        let result = checkout.scan(Product::new("Refund", "RF1", Money::from_minor(-100, GBP)));

        assert_eq!(
            result,
            Err(CheckoutError::InvalidProduct(
                ProductCode::from("RF1"),
                Decimal::new(-100, 2)
            ))
        );
        assert!(checkout.is_empty());
    }

    #[test]
    fn scan_rejects_negative_prices_below_one_minor_unit_or_beyond_i64() {
        let mut checkout = Checkout::new(GBP);

        let tiny = Money::from_decimal(Decimal::new(-1, 3), GBP);
        let huge = Money::from_decimal(Decimal::from(-1_000_000_000_000_000_000_i64), GBP);

        assert_eq!(
            checkout.scan(Product::new("Refund", "RF1", tiny)),
            Err(CheckoutError::InvalidProduct(
                ProductCode::from("RF1"),
                Decimal::new(-1, 3)
            ))
        );
        assert!(matches!(
            checkout.scan(Product::new("Refund", "RF2", huge)),
            Err(CheckoutError::InvalidProduct(..))
        ));
        assert!(checkout.is_empty());
        assert_eq!(checkout.subtotal(), Money::from_minor(0, GBP));
    }

    #[test]
    fn scan_rejects_prices_without_whole_minor_units() {
        let mut checkout = Checkout::new(GBP);

        let fraction = Money::from_decimal(Decimal::new(3115, 3), GBP);
        let huge = Money::from_decimal(Decimal::from(1_000_000_000_000_000_000_i64), GBP);

        assert_eq!(
            checkout.scan(Product::new("Fruit tea", "FR1", fraction)),
            Err(CheckoutError::UnrepresentablePrice(
                ProductCode::from("FR1"),
                Decimal::new(3115, 3)
            ))
        );
        assert!(matches!(
            checkout.scan(Product::new("Fruit tea", "FR1", huge)),
            Err(CheckoutError::UnrepresentablePrice(..))
        ));
        assert!(checkout.is_empty());
        assert_eq!(checkout.subtotal(), Money::from_minor(0, GBP));
    }

    #[test]
    fn scan_accepts_free_products() -> TestResult {
        let mut checkout = Checkout::new(GBP);

        checkout.scan(Product::new("Sample", "SM1", Money::from_minor(0, GBP)))?;

        assert_eq!(checkout.len(), 1);
        assert_eq!(checkout.total()?, Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn scan_rejects_currency_mismatch() {
        let mut checkout = Checkout::new(GBP);
        let result = checkout.scan(Product::new("Coffee", "CF1", Money::from_minor(100, USD)));

        match result {
            Err(CheckoutError::CurrencyMismatch(code, product_currency, checkout_currency)) => {
                assert_eq!(code.as_str(), "CF1");
                assert_eq!(product_currency, USD.iso_alpha_code);
                assert_eq!(checkout_currency, GBP.iso_alpha_code);
            }
            other => panic!("expected CurrencyMismatch error, got {other:?}"),
        }

        assert_eq!(checkout.subtotal(), Money::from_minor(0, GBP));
    }

    #[test]
    fn scan_all_stops_at_first_error() {
        let mut checkout = Checkout::new(GBP);
        let result = checkout.scan_all([
            coffee(),
            Product::new("Refund", "RF1", Money::from_minor(-1, GBP)),
            coffee(),
        ]);

        assert!(matches!(result, Err(CheckoutError::InvalidProduct(..))));
        assert_eq!(checkout.len(), 1);
    }

    #[test]
    fn receipt_breaks_down_each_code() -> TestResult {
        let mut checkout = Checkout::new(GBP);

        checkout.scan_all([fruit_tea()?, fruit_tea()?, coffee()])?;

        let receipt = checkout.receipt()?;
        let lines = receipt.lines();

        assert_eq!(lines.len(), 2);
        assert_eq!(receipt.subtotal(), Money::from_minor(1745, GBP));
        assert_eq!(receipt.discounts(), Money::from_minor(311, GBP));
        assert_eq!(receipt.total(), checkout.total()?);

        let tea = lines.first().ok_or("expected tea line")?;

        assert_eq!(tea.quantity, 2);
        assert_eq!(tea.subtotal, Money::from_minor(622, GBP));
        assert_eq!(tea.reduction, Money::from_minor(311, GBP));
        assert_eq!(tea.offer.as_deref(), Some("Buy one get one free"));

        let coffee_line = lines.get(1).ok_or("expected coffee line")?;

        assert_eq!(coffee_line.reduction, Money::from_minor(0, GBP));
        assert!(coffee_line.offer.is_none());

        Ok(())
    }
}
