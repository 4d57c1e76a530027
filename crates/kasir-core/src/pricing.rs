//! # Cart Pricing
//!
//! Turns `(product, quantity, ledger price)` triples into line snapshots and
//! an exact total.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each cart line (input order)                                       │
//! │      unit_price  ◄── Price Ledger (kasir-db)                            │
//! │      subtotal    =   unit_price × quantity        (checked decimal)     │
//! │      total      +=   subtotal                     (checked decimal)     │
//! │                                                                         │
//! │  change_due = amount_paid − total                 (may be negative)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// A priced cart line, frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Accumulates priced lines and their running total.
#[derive(Debug, Clone, Default)]
pub struct PricedCart {
    lines: Vec<PricedLine>,
    total: Money,
}

impl PricedCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prices one line and adds its subtotal to the total.
    pub fn add_line(
        &mut self,
        product_id: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> CoreResult<&PricedLine> {
        let subtotal = unit_price
            .checked_mul_quantity(quantity)
            .ok_or(CoreError::AmountOverflow)?;
        self.total = self
            .total
            .checked_add(subtotal)
            .ok_or(CoreError::AmountOverflow)?;

        self.lines.push(PricedLine {
            product_id: product_id.into(),
            quantity,
            unit_price,
            subtotal,
        });
        Ok(&self.lines[self.lines.len() - 1])
    }

    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `amount_paid − total`. Negative means the customer underpaid.
    pub fn change_due(&self, amount_paid: Money) -> CoreResult<Money> {
        amount_paid
            .checked_sub(self.total)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Rejects underpayment. Used when the store disallows it.
    pub fn ensure_paid(&self, amount_paid: Money) -> CoreResult<()> {
        if amount_paid < self.total {
            return Err(CoreError::InsufficientPayment {
                total: self.total,
                paid: amount_paid,
            });
        }
        Ok(())
    }

    pub fn into_lines(self) -> Vec<PricedLine> {
        self.lines
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
