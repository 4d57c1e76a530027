//! Request extractors that report rejections as `{msg}` bodies.
//!
//! axum's own `Json`, `Query` and `Path` answer malformed input with plain
//! text; these wrappers route the rejection through [`ApiError`] instead.

use axum::extract::{FromRequest, FromRequestParts};
use kasir_core::validation::canonical_uuid;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Checks that a path segment is an entity ID and returns it in the
/// lowercase hyphenated form IDs are stored in.
///
/// ## Example
/// ```text
/// GET /categories/42  →  400 {"msg": "Invalid Category ID format."}
/// ```
pub fn entity_id(entity: &str, raw: String) -> ApiResult<String> {
    match canonical_uuid(entity, &raw) {
        Ok(id) => Ok(id),
        Err(_) => Err(ApiError::BadRequest(format!("Invalid {entity} ID format."))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id() {
        let id = "550e8400-e29b-41d4-a716-446655440000".to_string();
        assert_eq!(entity_id("Product", id.clone()).unwrap(), id);

        let upper = "550E8400-E29B-41D4-A716-446655440000".to_string();
        assert_eq!(entity_id("Product", upper).unwrap(), id);

        let simple = "550e8400e29b41d4a716446655440000".to_string();
        assert_eq!(entity_id("Product", simple).unwrap(), id);

        let err = entity_id("Product", "42".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid Product ID format.");
    }
}
