//! # Money Module
//!
//! Provides the `Money` type for handling monetary values exactly.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With binary floats:                                                    │
//! │    0.10 + 0.10 + 0.10 = 0.30000000000000004  ❌ WRONG!                  │
//! │                                                                         │
//! │  Price-change detection compares amounts for equality, so drift here   │
//! │  opens new price ledger rows that should never exist.                  │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal, two fractional digits            │
//! │    0.10 + 0.10 + 0.10 = 0.30                                            │
//! │    25000 × 2 = 50000.00                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Boundaries
//! - JSON input: number or numeric string, parsed straight into a decimal
//! - JSON output: string with two fractional digits (`"50000.00"`)
//! - SQLite: TEXT in the same canonical form
//!
//! ## Usage
//! ```rust
//! use kasir_core::money::Money;
//!
//! let price: Money = "25000".parse().unwrap();
//! let subtotal = price.checked_mul_quantity(2).unwrap();
//! assert_eq!(subtotal.to_string(), "50000.00");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

/// Number of fractional digits every stored or rendered amount carries.
pub const MONEY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// An exact monetary amount.
///
/// ## Design Decisions
/// - **Decimal, not cents**: prices arrive as decimal literals from clients
///   and are compared for equality by the price ledger
/// - **Signed**: change due may be negative when underpayment is allowed
/// - **Equality is numeric**: `1.5 == 1.50`
///
/// ## Where Money Flows
/// ```text
/// PriceHistory.price ──► unit price snapshot ──► × quantity ──► subtotal
///                                                                  │
///                                      Σ subtotals ──► total_amount
///                                                                  │
///                          amount_paid − total_amount ──► change_due
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Whole currency units, e.g. `Money::from_units(25000)` for Rp 25.000.
    #[inline]
    pub fn from_units(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// The underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Number of significant fractional digits, ignoring trailing zeros.
    ///
    /// `"1.500"` has a significant scale of 1.
    pub fn significant_scale(&self) -> u32 {
        self.0.normalize().scale()
    }

    /// True when the amount can be stored without rounding.
    pub fn fits_scale(&self) -> bool {
        self.significant_scale() <= MONEY_SCALE
    }

    /// The amount rescaled to [`MONEY_SCALE`] digits.
    pub fn rounded(&self) -> Decimal {
        let mut amount = self.0;
        amount.rescale(MONEY_SCALE);
        amount
    }

    /// Multiplies a unit price by a line quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Product: Kopi Susu Rp 25.000
    /// Quantity: 2
    ///      │
    ///      ▼
    /// checked_mul_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Subtotal: 50000.00
    /// ```
    ///
    /// Returns `None` on decimal overflow.
    pub fn checked_mul_quantity(&self, quantity: i64) -> Option<Money> {
        self.0.checked_mul(Decimal::from(quantity)).map(Money)
    }

    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(&self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Canonical text form used for storage (`"1234.50"`).
    pub fn to_storage_string(&self) -> String {
        self.rounded().to_string()
    }

    /// Parses the canonical text form read back from storage.
    pub fn from_storage(text: &str) -> Result<Money, rust_decimal::Error> {
        Decimal::from_str(text.trim()).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal with two fractional digits, no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rounded())
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Accepts a JSON number or a numeric string.
///
/// The scale is kept as sent so validation can reject amounts with more
/// than two fractional digits instead of silently rounding them.
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Money)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_three_dimes_sum_exactly() {
        let total: Money = [money("0.10"), money("0.10"), money("0.10")].into_iter().sum();
        assert_eq!(total, money("0.30"));
        assert_eq!(total.to_string(), "0.30");
    }

    #[test]
    fn test_equality_ignores_trailing_zeros() {
        assert_eq!(money("1.5"), money("1.50"));
        assert_eq!(money("25000"), Money::from_units(25000));
    }

    #[test]
    fn test_display_uses_two_digits() {
        assert_eq!(Money::from_units(50000).to_string(), "50000.00");
        assert_eq!(money("0.5").to_string(), "0.50");
        assert_eq!(money("-10000").to_string(), "-10000.00");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_units(25000);
        assert_eq!(unit_price.checked_mul_quantity(2), Some(Money::from_units(50000)));
        assert_eq!(money("2.99").checked_mul_quantity(3), Some(money("8.97")));
    }

    #[test]
    fn test_multiply_overflow_is_reported() {
        let huge = Money::new(Decimal::MAX);
        assert_eq!(huge.checked_mul_quantity(2), None);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_negative());
        assert!(!Money::zero().is_positive());
        assert!(money("-0.01").is_negative());
        assert!(money("0.01").is_positive());
    }

    #[test]
    fn test_scale_fit() {
        assert!(money("10").fits_scale());
        assert!(money("10.25").fits_scale());
        assert!(money("10.250").fits_scale());
        assert!(!money("10.255").fits_scale());
    }

    #[test]
    fn test_storage_form() {
        let price = money("12500.5");
        assert_eq!(price.to_storage_string(), "12500.50");
        assert_eq!(Money::from_storage("12500.50").unwrap(), price);
        assert!(Money::from_storage("not money").is_err());
    }

    #[test]
    fn test_json_accepts_number_and_string() {
        let from_number: Money = serde_json::from_str("25000.5").unwrap();
        let from_string: Money = serde_json::from_str("\"25000.50\"").unwrap();
        assert_eq!(from_number, from_string);

        let float_literal: Money = serde_json::from_str("0.1").unwrap();
        assert_eq!(float_literal, money("0.1"));

        let too_precise: Money = serde_json::from_str("\"0.125\"").unwrap();
        assert!(!too_precise.fits_scale());
        assert!(serde_json::from_str::<Money>("\"abc\"").is_err());
    }

    #[test]
    fn test_json_output_is_string() {
        let json = serde_json::to_string(&Money::from_units(60000)).unwrap();
        assert_eq!(json, "\"60000.00\"");
    }

    #[test]
    fn test_change_due_may_go_negative() {
        let paid = Money::from_units(40000);
        let total = Money::from_units(50000);
        assert_eq!(paid.checked_sub(total), Some(Money::from_units(-10000)));
    }
}
