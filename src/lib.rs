//! Checkout
//!
//! A supermarket checkout that prices scanned products and applies per-product
//! quantity offers (buy one get one free, bulk percentage discounts).
//!
//! Units are aggregated by product code before any offer is evaluated, so each
//! offer sees the full quantity of its product exactly once.

pub mod checkout;
pub mod discounts;
pub mod fixtures;
pub mod offers;
pub mod prelude;
pub mod products;
pub mod receipt;
