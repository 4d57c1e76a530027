//! `/products/:id/price-histories` and `/products/:id/price-history`
//!
//! ```text
//! POST {price}
//!      │
//!      ├── same as open entry  → 200 {msg}, nothing written
//!      └── different           → 201 new open entry (previous one closed)
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kasir_core::input::PriceEntry;
use kasir_core::validation::validate_pagination;
use kasir_core::PriceHistory;
use kasir_db::PriceChange;
use serde::{Deserialize, Serialize};

use super::message;
use crate::error::ApiResult;
use crate::extract::{entity_id, ApiJson, ApiPath, ApiQuery};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryList {
    pub product_price_histories: Vec<PriceHistory>,
    pub total: i64,
    pub page: u32,
    pub pages: u32,
}

/// Newest entry first.
pub async fn list(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<String>,
    ApiQuery(params): ApiQuery<HistoryParams>,
) -> ApiResult<Json<PriceHistoryList>> {
    let product_id = entity_id("Product", product_id)?;
    let pagination = validate_pagination(params.limit, params.page)?;

    let page = state
        .db
        .price_ledger()
        .list_history(&product_id, pagination)
        .await?;

    Ok(Json(PriceHistoryList {
        product_price_histories: page.items,
        total: page.total,
        page: page.page,
        pages: page.pages,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<String>,
    ApiJson(entry): ApiJson<PriceEntry>,
) -> ApiResult<Response> {
    let product_id = entity_id("Product", product_id)?;
    let price = entry.validate()?;

    let response = match state.db.price_ledger().set_price(&product_id, price).await? {
        PriceChange::Changed { entry, .. } => (StatusCode::CREATED, Json(entry)).into_response(),
        PriceChange::Unchanged(_) => {
            message("Price is the same as current price. No update performed.").into_response()
        }
    };
    Ok(response)
}
