//! Receipt

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    Table,
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{discounts::percent_points, products::ProductCode};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Writing the receipt failed
    #[error("Failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

/// One product code on a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Product code
    pub code: ProductCode,

    /// Product name
    pub name: String,

    /// Units scanned
    pub quantity: usize,

    /// Unit price of the representative product
    pub unit_price: Money<'a, Currency>,

    /// Sum of the prices of all scanned units
    pub subtotal: Money<'a, Currency>,

    /// Description of the offer, if the product has one
    pub offer: Option<String>,

    /// Reduction owed by the offer
    pub reduction: Money<'a, Currency>,
}

/// Final receipt for a priced checkout.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: SmallVec<[ReceiptLine<'a>; 10]>,

    /// Total cost before any offers
    subtotal: Money<'a, Currency>,

    /// Sum of all offer reductions
    discounts: Money<'a, Currency>,

    /// Amount payable after offers
    total: Money<'a, Currency>,

    /// Currency used for all monetary values
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Create a new receipt with the given details.
    #[must_use]
    pub fn new(
        lines: SmallVec<[ReceiptLine<'a>; 10]>,
        subtotal: Money<'a, Currency>,
        discounts: Money<'a, Currency>,
        total: Money<'a, Currency>,
        currency: &'static Currency,
    ) -> Self {
        Self {
            lines,
            subtotal,
            discounts,
            total,
            currency,
        }
    }

    /// Receipt lines, one per product code.
    #[must_use]
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Total cost before any offers
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Sum of all offer reductions
    #[must_use]
    pub fn discounts(&self) -> Money<'a, Currency> {
        self.discounts
    }

    /// Amount payable
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Calculate the savings made by applying offers.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// Calculates the savings as a percentage of the subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings = self.savings()?;
        let subtotal = *self.subtotal.amount();

        if subtotal.is_zero() {
            return Ok(Percentage::from(Decimal::ZERO));
        }

        Ok(Percentage::from(*savings.amount() / subtotal))
    }

    /// Writes the receipt table and summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "Code",
            "Item",
            "Qty",
            "Unit Price",
            "Price",
            "Savings",
            "Offer",
        ]);

        for line in &self.lines {
            let savings = if line.reduction.amount().is_zero() {
                String::new()
            } else {
                format!("-{}", line.reduction)
            };

            builder.push_record([
                line.code.to_string(),
                line.name.clone(),
                line.quantity.to_string(),
                format!("{}", line.unit_price),
                format!("{}", line.subtotal),
                savings,
                line.offer.clone().unwrap_or_default(),
            ]);
        }

        let lines = lines_table(builder, !self.lines.is_empty());
        let summary = self.summary_table()?;

        writeln!(out, "\n{lines}")?;
        writeln!(out, "{summary}")?;

        Ok(())
    }

    /// Subtotal, savings and total, right-aligned beneath the lines.
    fn summary_table(&self) -> Result<Table, MoneyError> {
        let savings = self.savings()?;
        let points = percent_points(&self.savings_percent()?).round_dp(2);

        let mut builder = Builder::default();

        builder.push_record(["Subtotal:".to_string(), self.subtotal.to_string()]);
        builder.push_record(["Savings:".to_string(), format!("({points:.2}%) {savings}")]);
        builder.push_record(["Total:".to_string(), self.total.to_string()]);

        let mut table = builder.build();

        table.with(Style::blank());
        table.modify(Columns::new(0..2), Alignment::right());
        table.modify(Rows::last(), Color::BOLD);

        Ok(table)
    }
}

fn lines_table(builder: Builder, has_lines: bool) -> Table {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..6), Alignment::right());

    // Offer descriptions are secondary to prices
    if has_lines {
        table.modify(Columns::new(6..7), Color::FG_BRIGHT_BLACK);
    }

    table
}
