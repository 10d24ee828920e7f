//! Checkout prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    checkout::{Checkout, CheckoutError, LineReduction, ScannedLine},
    discounts::DiscountError,
    fixtures::{Fixture, FixtureError},
    offers::{BuyOneGetOneFree, Offer, OfferError, ThresholdPercentDiscount},
    products::{Product, ProductCode},
    receipt::{Receipt, ReceiptError, ReceiptLine},
};
