//! # Validation Module
//!
//! Input validation utilities for Kasir.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (kasir-api)                                  │
//! │  └── JSON shape, types, path/query parsing                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── lengths, ranges, formats                                          │
//! │  └── decimal scale of money inputs                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE constraints (names, invoice codes)                         │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::validation::{validate_name, validate_quantity};
//!
//! assert!(validate_name("Category name", "Minuman", 2, 100).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::{Money, MONEY_SCALE};
use crate::types::{Pagination, MAX_PAGE_LIMIT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name.
///
/// ## Rules
/// - Must not be blank
/// - Trimmed length must be within `min..=max` characters
pub fn validate_name(field: &str, name: &str, min: usize, max: usize) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    let len = name.chars().count();
    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an optional free-text field. Blank is allowed.
pub fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.trim().chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query, or `None` when blank.
pub fn validate_search_query(query: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return Ok(None);
    };

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "Search query".to_string(),
            max: 100,
        });
    }

    Ok(Some(query.to_string()))
}

/// Validates an image URL: absolute `http`/`https` with a host and no spaces.
pub fn validate_image_url(url: &str) -> ValidationResult<()> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| ValidationError::invalid_format("Image URL", "must be a valid URL"))?;

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || url.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(
            "Image URL",
            "must be a valid URL",
        ));
    }

    Ok(())
}

/// Validates an email address shape: `local@domain.tld`, at most 255 chars.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "Email".to_string(),
            max: 255,
        });
    }

    let invalid = || ValidationError::invalid_format("Email", "must be a valid email address");
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - At most 50 characters
/// - Only digits, spaces, `-`, `(`, `)` and `+`
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    if phone.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "Phone number".to_string(),
            max: 50,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | '(' | ')' | '+' | ' '))
    {
        return Err(ValidationError::invalid_format(
            "Phone number",
            "contains invalid characters",
        ));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /transactions  items: [{productId, quantity: 0}]                 │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(0) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       └── qty < 1 → 400 "Quantity cannot be less than 1"               │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    validate_min("Quantity", qty, 1)
}

/// Validates that `value >= min`.
pub fn validate_min(field: &str, value: i64, min: i64) -> ValidationResult<()> {
    if value < min {
        return Err(ValidationError::BelowMinimum {
            field: field.to_string(),
            min,
        });
    }
    Ok(())
}

/// Validates a money input.
///
/// ## Rules
/// - Must be non-negative (zero is allowed, e.g. free items)
/// - At most two significant fractional digits
///
/// ## Example
/// ```rust
/// use kasir_core::money::Money;
/// use kasir_core::validation::validate_money;
///
/// assert!(validate_money("Price", "25000.50".parse().unwrap()).is_ok());
/// assert!(validate_money("Price", "0.125".parse().unwrap()).is_err());
/// assert!(validate_money("Price", "-1".parse().unwrap()).is_err());
/// ```
pub fn validate_money(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::BelowMinimum {
            field: field.to_string(),
            min: 0,
        });
    }

    if !amount.fits_scale() {
        return Err(ValidationError::TooManyDecimals {
            field: field.to_string(),
            max: MONEY_SCALE,
        });
    }

    Ok(())
}

/// Validates `limit`/`page` query parameters and applies defaults.
pub fn validate_pagination(limit: Option<u32>, page: Option<u32>) -> ValidationResult<Pagination> {
    let defaults = Pagination::default();
    let limit = limit.unwrap_or(defaults.limit);
    let page = page.unwrap_or(defaults.page);

    if limit < 1 {
        return Err(ValidationError::BelowMinimum {
            field: "limit".to_string(),
            min: 1,
        });
    }
    if limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::AboveMaximum {
            field: "limit".to_string(),
            max: i64::from(MAX_PAGE_LIMIT),
        });
    }
    if page < 1 {
        return Err(ValidationError::BelowMinimum {
            field: "page".to_string(),
            min: 1,
        });
    }

    Ok(Pagination { limit, page })
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates an entity identifier.
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_uuid;
///
/// assert!(validate_uuid("Product ID", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("Product ID", "42").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id.trim())
        .map_err(|_| ValidationError::invalid_format(field, "must be a valid UUID"))?;

    Ok(())
}

/// Validates an ID and returns it in canonical form (lowercase, hyphenated),
/// the form every stored ID uses.
pub fn canonical_uuid(field: &str, id: &str) -> ValidationResult<String> {
    validate_uuid(field, id)?;
    uuid::Uuid::parse_str(id.trim())
        .map(|parsed| parsed.hyphenated().to_string())
        .map_err(|_| ValidationError::invalid_format(field, "must be a valid UUID"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Product name", "Kopi Susu", 3, 255).is_ok());
        assert!(validate_name("Product name", "  ", 3, 255).is_err());
        assert!(validate_name("Product name", "ab", 3, 255).is_err());
        assert!(validate_name("Product name", &"A".repeat(256), 3, 255).is_err());

        let err = validate_name("Category name", "", 2, 100).unwrap_err();
        assert_eq!(err.to_string(), "Category name is required");
    }

    #[test]
    fn test_validate_optional_text() {
        assert!(validate_optional_text("Description", None, 10).is_ok());
        assert!(validate_optional_text("Description", Some(""), 10).is_ok());
        assert!(validate_optional_text("Description", Some(&"x".repeat(11)), 10).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query(None).unwrap(), None);
        assert_eq!(validate_search_query(Some("   ")).unwrap(), None);
        assert_eq!(
            validate_search_query(Some(" kopi ")).unwrap(),
            Some("kopi".to_string())
        );
        assert!(validate_search_query(Some(&"q".repeat(101))).is_err());
    }

    #[test]
    fn test_validate_image_url() {
        assert!(validate_image_url("https://cdn.example.com/kopi.png").is_ok());
        assert!(validate_image_url("http://localhost:8080/a.jpg").is_ok());
        assert!(validate_image_url("ftp://example.com/a.jpg").is_err());
        assert!(validate_image_url("https:///a.jpg").is_err());
        assert!(validate_image_url("not a url").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("sales@supplier.co.id").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a@@b.com").is_err());
        assert!(validate_email("a b@c.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+62 (21) 555-0101").is_ok());
        assert!(validate_phone("0812abc").is_err());
        assert!(validate_phone(&"1".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_money() {
        let m = |s: &str| s.parse::<Money>().unwrap();
        assert!(validate_money("Price", m("0")).is_ok());
        assert!(validate_money("Price", m("25000")).is_ok());
        assert!(validate_money("Price", m("10.50")).is_ok());

        let err = validate_money("Price", m("10.505")).unwrap_err();
        assert_eq!(err.to_string(), "Price can have at most 2 decimal places");

        let err = validate_money("Price", m("-5")).unwrap_err();
        assert_eq!(err.to_string(), "Price cannot be less than 0");
    }

    #[test]
    fn test_validate_pagination() {
        assert_eq!(validate_pagination(None, None).unwrap(), Pagination::default());
        assert_eq!(
            validate_pagination(Some(25), Some(3)).unwrap(),
            Pagination { limit: 25, page: 3 }
        );
        assert!(validate_pagination(Some(0), None).is_err());
        assert!(validate_pagination(None, Some(0)).is_err());
        assert!(validate_pagination(Some(101), None).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
        assert!(validate_uuid("id", "123").is_err());
    }

    #[test]
    fn test_canonical_uuid() {
        let canonical = "550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(canonical_uuid("id", canonical).unwrap(), canonical);
        assert_eq!(
            canonical_uuid("id", " 550E8400-E29B-41D4-A716-446655440000 ").unwrap(),
            canonical
        );
        assert!(canonical_uuid("id", "123").is_err());
    }
}
