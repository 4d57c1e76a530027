//! Route handlers, one module per resource.
//!
//! Handlers parse and validate the request shape, call into kasir-db, and
//! shape the response. Business rules live below them.

pub mod categories;
pub mod health;
pub mod price_history;
pub mod product_suppliers;
pub mod products;
pub mod suppliers;
pub mod transaction_types;
pub mod transactions;

use axum::Json;
use kasir_core::validation::{validate_pagination, validate_search_query};
use kasir_core::Pagination;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

/// `{msg}` body for confirmations.
#[derive(Debug, Serialize)]
pub struct Message {
    pub msg: String,
}

pub fn message(msg: impl Into<String>) -> Json<Message> {
    Json(Message { msg: msg.into() })
}

/// `?search&limit&page`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl ListParams {
    pub fn pagination(&self) -> ApiResult<Pagination> {
        Ok(validate_pagination(self.limit, self.page)?)
    }

    pub fn search(&self) -> ApiResult<Option<String>> {
        Ok(validate_search_query(self.search.as_deref())?)
    }
}
