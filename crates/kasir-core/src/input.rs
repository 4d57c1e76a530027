//! # Request Contracts
//!
//! Typed inputs for every write operation, each with a `validate` method.
//!
//! ## Partial Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  JSON in patch body        Rust value              Effect               │
//! │  ─────────────────────     ────────────────────    ──────────────────   │
//! │  field absent              None                    keep current value   │
//! │  "description": null       Some(None)              clear                │
//! │  "description": ""         Some(Some(""))          clear (blank)        │
//! │  "description": "x"        Some(Some("x"))         set                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! A patch with every field absent is rejected with
//! [`ValidationError::EmptyUpdate`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::PaymentMethod;
use crate::validation::{
    validate_email, validate_image_url, validate_min, validate_money, validate_name,
    validate_optional_text, validate_phone, validate_quantity, validate_uuid, ValidationResult,
};

/// Deserializes a present-but-null field as `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trims text and turns blank strings into `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolves a nullable patch field against the current value.
pub fn patch_text(current: Option<String>, patch: &Option<Option<String>>) -> Option<String> {
    match patch {
        None => current,
        Some(value) => non_blank(value.as_deref()),
    }
}

fn nested_text(value: &Option<Option<String>>) -> Option<&str> {
    value.as_ref().and_then(|v| v.as_deref())
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCategory {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("Category name", &self.name, 2, 100)?;
        validate_optional_text("Category description", self.description.as_deref(), 500)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl CategoryPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.name.is_none() && self.description.is_none() {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(name) = &self.name {
            validate_name("Category name", name, 2, 100)?;
        }
        validate_optional_text("Category description", nested_text(&self.description), 500)
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn validate_supplier_contacts(
    contact_person: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
    address: Option<&str>,
    notes: Option<&str>,
) -> ValidationResult<()> {
    validate_optional_text("Contact person", contact_person, 255)?;
    if let Some(phone) = phone.filter(|p| !p.trim().is_empty()) {
        validate_phone(phone)?;
    }
    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }
    validate_optional_text("Address", address, 1000)?;
    validate_optional_text("Notes", notes, 1000)
}

impl NewSupplier {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("Supplier name", &self.name, 3, 255)?;
        validate_supplier_contacts(
            self.contact_person.as_deref(),
            self.phone.as_deref(),
            self.email.as_deref(),
            self.address.as_deref(),
            self.notes.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub contact_person: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

impl SupplierPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.name.is_none()
            && self.contact_person.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.notes.is_none()
        {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(name) = &self.name {
            validate_name("Supplier name", name, 3, 255)?;
        }
        validate_supplier_contacts(
            nested_text(&self.contact_person),
            nested_text(&self.phone),
            nested_text(&self.email),
            nested_text(&self.address),
            nested_text(&self.notes),
        )
    }
}

// =============================================================================
// Transaction Type
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransactionType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to `false` (a sale takes stock out).
    #[serde(default)]
    pub is_positive_stock_effect: Option<bool>,
    /// Defaults to `true` (a sale brings revenue in).
    #[serde(default)]
    pub is_positive_revenue_effect: Option<bool>,
}

impl NewTransactionType {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("Transaction type name", &self.name, 2, 100)?;
        validate_optional_text("Description", self.description.as_deref(), 500)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionTypePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub is_positive_stock_effect: Option<bool>,
    #[serde(default)]
    pub is_positive_revenue_effect: Option<bool>,
}

impl TransactionTypePatch {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.name.is_none()
            && self.description.is_none()
            && self.is_positive_stock_effect.is_none()
            && self.is_positive_revenue_effect.is_none()
        {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(name) = &self.name {
            validate_name("Transaction type name", name, 2, 100)?;
        }
        validate_optional_text("Description", nested_text(&self.description), 500)
    }
}

// =============================================================================
// Product
// =============================================================================

/// Body of `POST /products`.
///
/// `category` is accepted as an alias of `categoryId`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, alias = "category")]
    pub category_id: String,
    /// Opens the product's price ledger when present.
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub discount: Option<Money>,
}

fn validate_image(image_url: Option<&str>) -> ValidationResult<()> {
    match image_url.filter(|u| !u.trim().is_empty()) {
        Some(url) => validate_image_url(url),
        None => Ok(()),
    }
}

impl NewProduct {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("Product name", &self.name, 3, 255)?;
        validate_optional_text("Product description", self.description.as_deref(), 1000)?;
        let stock = self.stock.ok_or_else(|| ValidationError::required("Stock"))?;
        validate_min("Stock", stock, 0)?;
        validate_image(self.image_url.as_deref())?;
        validate_uuid("Category ID", &self.category_id)?;
        if let Some(price) = self.price {
            validate_money("Price", price)?;
        }
        if let Some(discount) = self.discount {
            validate_money("Discount", discount)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
    #[serde(default, alias = "category")]
    pub category_id: Option<String>,
    /// Routed through the price ledger, not written to the product row.
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default, deserialize_with = "nullable")]
    pub discount: Option<Option<Money>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.stock.is_none()
            && self.image_url.is_none()
            && self.category_id.is_none()
            && self.price.is_none()
            && self.discount.is_none()
    }

    /// False for a price-only patch, which leaves the product row as is.
    pub fn touches_row(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.stock.is_some()
            || self.image_url.is_some()
            || self.category_id.is_some()
            || self.discount.is_some()
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(name) = &self.name {
            validate_name("Product name", name, 3, 255)?;
        }
        validate_optional_text("Product description", nested_text(&self.description), 1000)?;
        if let Some(stock) = self.stock {
            validate_min("Stock", stock, 0)?;
        }
        validate_image(nested_text(&self.image_url))?;
        if let Some(category_id) = &self.category_id {
            validate_uuid("Category ID", category_id)?;
        }
        if let Some(price) = self.price {
            validate_money("Price", price)?;
        }
        if let Some(Some(discount)) = self.discount {
            validate_money("Discount", discount)?;
        }
        Ok(())
    }
}

/// Body of `POST /products/:productId/price-history`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceEntry {
    #[serde(default)]
    pub price: Option<Money>,
}

impl PriceEntry {
    /// Returns the validated price.
    pub fn validate(&self) -> ValidationResult<Money> {
        let price = self.price.ok_or_else(|| ValidationError::required("Price"))?;
        validate_money("Price", price)?;
        Ok(price)
    }
}

// =============================================================================
// Product Supplier
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductSupplier {
    #[serde(default)]
    pub supplier_id: String,
    #[serde(default)]
    pub supplier_sku: Option<String>,
    #[serde(default)]
    pub unit_cost: Option<Money>,
    #[serde(default)]
    pub min_order_quantity: Option<i64>,
    #[serde(default)]
    pub lead_time_days: Option<i64>,
    #[serde(default)]
    pub last_purchased_at: Option<DateTime<Utc>>,
}

fn validate_sourcing_terms(
    supplier_sku: Option<&str>,
    min_order_quantity: Option<i64>,
    lead_time_days: Option<i64>,
) -> ValidationResult<()> {
    validate_optional_text("Supplier SKU", supplier_sku, 100)?;
    if let Some(moq) = min_order_quantity {
        validate_min("Minimum order quantity", moq, 1)?;
    }
    if let Some(days) = lead_time_days {
        validate_min("Lead time days", days, 0)?;
    }
    Ok(())
}

impl NewProductSupplier {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid("Supplier ID", &self.supplier_id)?;
        let unit_cost = self
            .unit_cost
            .ok_or_else(|| ValidationError::required("Unit cost"))?;
        validate_money("Unit cost", unit_cost)?;
        validate_sourcing_terms(
            self.supplier_sku.as_deref(),
            self.min_order_quantity,
            self.lead_time_days,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSupplierPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub supplier_sku: Option<Option<String>>,
    #[serde(default)]
    pub unit_cost: Option<Money>,
    #[serde(default, deserialize_with = "nullable")]
    pub min_order_quantity: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub lead_time_days: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub last_purchased_at: Option<Option<DateTime<Utc>>>,
}

impl ProductSupplierPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.supplier_sku.is_none()
            && self.unit_cost.is_none()
            && self.min_order_quantity.is_none()
            && self.lead_time_days.is_none()
            && self.last_purchased_at.is_none()
        {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(cost) = self.unit_cost {
            validate_money("Unit cost", cost)?;
        }
        validate_sourcing_terms(
            nested_text(&self.supplier_sku),
            self.min_order_quantity.flatten(),
            self.lead_time_days.flatten(),
        )
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// One requested cart line. The price is never taken from the client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Body of `POST /transactions`.
///
/// ## Validation Flow
/// ```text
/// CheckoutRequest
///      │
///      ├── items empty?            → EmptyCart
///      ├── bad productId/quantity  → InvalidFormat / BelowMinimum
///      ├── bad transactionTypeId   → InvalidFormat
///      ├── amountPaid < 0 / 3 dp   → BelowMinimum / TooManyDecimals
///      │
///      ▼
/// OK → Transaction Workflow (unit of work opens only now)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    pub amount_paid: Money,
    pub transaction_type_id: String,
    #[serde(default)]
    pub cashier_id: Option<String>,
}

impl CheckoutRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.items.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        for line in &self.items {
            validate_uuid("Product ID", &line.product_id)?;
            validate_quantity(line.quantity)?;
        }
        validate_uuid("Transaction type ID", &self.transaction_type_id)?;
        validate_money("Amount paid", self.amount_paid)?;
        validate_optional_text("Cashier ID", self.cashier_id.as_deref(), 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CATEGORY_ID: &str = "8d0c2f3e-5a43-4d7b-9a55-0e6c2f9a1b11";
    const PRODUCT_ID: &str = "0f5f3c1a-2b7d-4e8a-9c6d-1a2b3c4d5e6f";

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let absent: CategoryPatch = serde_json::from_str(r#"{"name":"Snacks"}"#).unwrap();
        assert!(absent.description.is_none());

        let cleared: CategoryPatch = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert!(cleared.validate().is_ok());

        assert_eq!(patch_text(Some("old".into()), &absent.description), Some("old".into()));
        assert_eq!(patch_text(Some("old".into()), &cleared.description), None);
        assert_eq!(patch_text(Some("old".into()), &Some(Some("  ".into()))), None);
    }

    #[test]
    fn test_empty_patch_rejected() {
        let patch: SupplierPatch = serde_json::from_str("{}").unwrap();
        let err = patch.validate().unwrap_err();
        assert_eq!(err.to_string(), "At least one field must be provided for update");

        let patch: ProductPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_new_product_rules() {
        let mut product = NewProduct {
            name: "Kopi Susu".into(),
            stock: Some(10),
            category_id: CATEGORY_ID.into(),
            price: Some(Money::from_units(25000)),
            ..Default::default()
        };
        assert!(product.validate().is_ok());

        product.stock = None;
        assert_eq!(product.validate().unwrap_err().to_string(), "Stock is required");

        product.stock = Some(-1);
        assert!(product.validate().is_err());

        product.stock = Some(0);
        product.image_url = Some("nope".into());
        assert!(product.validate().is_err());

        product.image_url = Some(String::new());
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_new_product_accepts_category_alias() {
        let json = format!(r#"{{"name":"Teh Manis","stock":3,"category":"{CATEGORY_ID}","price":5000}}"#);
        let product: NewProduct = serde_json::from_str(&json).unwrap();
        assert_eq!(product.category_id, CATEGORY_ID);
        assert_eq!(product.price, Some(Money::from_units(5000)));
    }

    #[test]
    fn test_price_only_patch_does_not_touch_row() {
        let patch: ProductPatch = serde_json::from_str(r#"{"price":"27000"}"#).unwrap();
        assert!(patch.validate().is_ok());
        assert!(!patch.touches_row());
    }

    #[test]
    fn test_price_entry() {
        let entry: PriceEntry = serde_json::from_str(r#"{"price":12.5}"#).unwrap();
        assert_eq!(entry.validate().unwrap(), "12.50".parse().unwrap());

        let entry: PriceEntry = serde_json::from_str("{}").unwrap();
        assert_eq!(entry.validate().unwrap_err().to_string(), "Price is required");

        let entry: PriceEntry = serde_json::from_str(r#"{"price":1.234}"#).unwrap();
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_supplier_contact_rules() {
        let supplier = NewSupplier {
            name: "PT Kopi Nusantara".into(),
            phone: Some("+62 812-0000".into()),
            email: Some(String::new()),
            ..Default::default()
        };
        assert!(supplier.validate().is_ok());

        let supplier = NewSupplier {
            email: Some("broken".into()),
            ..supplier
        };
        assert!(supplier.validate().is_err());
    }

    #[test]
    fn test_product_supplier_rules() {
        let link = NewProductSupplier {
            supplier_id: CATEGORY_ID.into(),
            unit_cost: Some(Money::from_units(18000)),
            min_order_quantity: Some(0),
            ..Default::default()
        };
        assert!(link.validate().is_err());

        let link = NewProductSupplier {
            min_order_quantity: Some(12),
            ..link
        };
        assert!(link.validate().is_ok());
    }

    #[test]
    fn test_checkout_request_rules() {
        let json = format!(
            r#"{{"items":[{{"productId":"{PRODUCT_ID}","quantity":2}}],"paymentMethod":"CASH","amountPaid":60000,"transactionTypeId":"{CATEGORY_ID}"}}"#
        );
        let request: CheckoutRequest = serde_json::from_str(&json).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.amount_paid, Money::from_units(60000));

        let empty = CheckoutRequest {
            items: vec![],
            ..request.clone()
        };
        assert!(matches!(empty.validate(), Err(ValidationError::EmptyCart)));

        let zero_qty = CheckoutRequest {
            items: vec![CartLine {
                product_id: PRODUCT_ID.into(),
                quantity: 0,
            }],
            ..request
        };
        assert!(zero_qty.validate().is_err());
    }
}
