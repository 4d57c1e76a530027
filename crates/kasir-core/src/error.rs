//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kasir-db errors                                                       │
//! │  ├── DbError          - Storage failures                               │
//! │  └── ServiceError     - CoreError | DbError                            │
//! │                                                                         │
//! │  kasir-api                                                             │
//! │  └── ApiError         - HTTP status + {msg}                            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError → client  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// Every variant carries a message fit to show a cashier or API client.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The resource addressed by the request does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    /// A cart line references a product that does not exist.
    #[error("Product with ID {0} not found")]
    ProductNotFound(String),

    /// The product exists but has no open price ledger entry.
    ///
    /// ## When This Occurs
    /// - Product was created without a price
    /// - A checkout is attempted before the first `setPrice`
    #[error("Product with ID {0} has no defined price")]
    NoPriceDefined(String),

    #[error("Invalid transaction type selected")]
    InvalidTransactionType(String),

    /// A request body references another entity that does not exist,
    /// e.g. a product created under an unknown category.
    #[error("{entity} with ID {id} not found")]
    InvalidReference { entity: &'static str, id: String },

    /// Unique name constraint.
    #[error("{entity} with name '{name}' already exists")]
    DuplicateName { entity: &'static str, name: String },

    #[error("Product is already linked to this supplier")]
    DuplicateLink {
        product_id: String,
        supplier_id: String,
    },

    /// Delete blocked by dependent rows.
    ///
    /// ## Example
    /// ```text
    /// DELETE /categories/:id  (2 products still in it)
    ///      │
    ///      ▼
    /// ReferentialConflict { entity: "category", dependents: "products" }
    ///      │
    ///      ▼
    /// "Cannot delete category: it is still referenced by existing products"
    /// ```
    #[error("Cannot delete {entity}: it is still referenced by existing {dependents}")]
    ReferentialConflict {
        entity: &'static str,
        dependents: &'static str,
    },

    /// Only raised when underpayment is disabled.
    #[error("Amount paid {paid} is less than total amount {total}")]
    InsufficientPayment { total: Money, paid: Money },

    #[error("Amount is too large to compute")]
    AmountOverflow,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn duplicate_name(entity: &'static str, name: impl Into<String>) -> Self {
        CoreError::DuplicateName {
            entity,
            name: name.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage access; a request failing here never opens a
/// unit of work.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} should have a minimum length of {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} should have a maximum length of {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} cannot be less than {min}")]
    BelowMinimum { field: String, min: i64 },

    #[error("{field} cannot be greater than {max}")]
    AboveMaximum { field: String, max: i64 },

    #[error("{field} can have at most {max} decimal places")]
    TooManyDecimals { field: String, max: u32 },

    /// Invalid format (e.g., invalid UUID, URL, email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("At least one field must be provided for update")]
    EmptyUpdate,

    #[error("Transaction must contain at least one item")]
    EmptyCart,
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
