//! # Domain Types
//!
//! Core domain types used throughout Kasir.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Category ◄──── Product ────► PriceHistory (append-only ledger)        │
//! │                    │  ▲                                                 │
//! │                    │  └──── ProductSupplier ────► Supplier             │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  TransactionType ◄──── Transaction ────► TransactionItem (snapshots)   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All identifiers are UUID v4 strings. JSON uses camelCase field names.
//! The `*Detail` types are read models that embed `{id, name}` summaries
//! of related rows for display.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Shared Summaries
// =============================================================================

/// `{id, name}` summary of a related row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Transaction Type
// =============================================================================

/// Classifies a transaction (sale, return, stock-in...).
///
/// The two effect flags describe how a transaction of this type moves stock
/// and revenue. They are reporting metadata; checkout does not act on them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionType {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_positive_stock_effect: bool,
    pub is_positive_revenue_effect: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// The sale price is NOT a column here: it lives in the price ledger
/// ([`PriceHistory`]) and is surfaced on [`ProductDetail::current_price`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Units on hand. Checkout does not decrement it.
    pub stock: i64,
    pub image_url: Option<String>,
    pub category_id: String,
    pub discount: Option<Money>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Product read model with its category and current price.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: EntityRef,
    /// Price of the open ledger entry, `None` when no price was ever set.
    pub current_price: Option<Money>,
}

// =============================================================================
// Price History
// =============================================================================

/// One entry of a product's append-only price ledger.
///
/// ## Ledger Shape
/// ```text
/// start_date           end_date        price
/// 2026-01-02 09:00     2026-03-01 10:12  20000.00   (closed)
/// 2026-03-01 10:12     2026-06-15 08:00  22500.00   (closed)
/// 2026-06-15 08:00     NULL              25000.00   ◄── current price
/// ```
///
/// At most one entry per product has `end_date = None`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistory {
    pub id: String,
    pub product_id: String,
    pub price: Money,
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,
}

impl PriceHistory {
    /// Open entries are the currently effective price.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }
}

// =============================================================================
// Product Supplier
// =============================================================================

/// Sourcing relationship between a product and a supplier.
///
/// `unit_cost` is what the store pays the supplier; it is independent of
/// the sale price in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSupplier {
    pub id: String,
    pub product_id: String,
    pub supplier_id: String,
    pub supplier_sku: Option<String>,
    pub unit_cost: Money,
    pub min_order_quantity: Option<i64>,
    pub lead_time_days: Option<i64>,
    #[ts(as = "Option<String>")]
    pub last_purchased_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRef {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSupplierDetail {
    #[serde(flatten)]
    pub link: ProductSupplier,
    pub product: EntityRef,
    pub supplier: SupplierRef,
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Qris,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Qris => "QRIS",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: `"cash"`, `"Cash"` and `"CASH"` are all accepted.
impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "CARD" => Ok(PaymentMethod::Card),
            "QRIS" => Ok(PaymentMethod::Qris),
            _ => Err(format!(
                "unknown payment method `{s}`, expected one of CASH, CARD, QRIS"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for PaymentMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    #[default]
    Completed,
    Pending,
    Cancelled,
}

// =============================================================================
// Transaction
// =============================================================================

/// A persisted sale.
///
/// `total_amount` and `change_due` are always computed server-side from the
/// price ledger; clients only supply quantities and the amount paid.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// Human-readable code, `INV-YYYYMMDD-NNN`.
    pub invoice_code: String,
    pub transaction_type_id: String,
    pub cashier_id: Option<String>,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub amount_paid: Money,
    pub change_due: Money,
    pub status: TransactionStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line item frozen at transaction time.
///
/// `price` is a snapshot of the ledger price when the sale happened; later
/// price changes never touch it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub price: Money,
    pub subtotal: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItemDetail {
    #[serde(flatten)]
    pub item: TransactionItem,
    pub product: EntityRef,
}

/// Transaction with its type and items, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub transaction_type: EntityRef,
    pub items: Vec<TransactionItemDetail>,
}

/// Filters for listing transactions. Bounds are `[from, until)`.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub cashier_id: Option<String>,
    pub transaction_type_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

// =============================================================================
// Pagination
// =============================================================================

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            limit: DEFAULT_PAGE_LIMIT,
            page: 1,
        }
    }
}

impl Pagination {
    /// Rows to skip.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    /// Total page count for `total` rows; zero rows means zero pages.
    pub fn pages_for(&self, total: i64) -> u32 {
        if total <= 0 || self.limit == 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        ((total + limit - 1) / limit) as u32
    }
}

/// One page of results plus the numbers needed to render a pager.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Page {
            items,
            total,
            page: pagination.page,
            pages: pagination.pages_for(total),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
