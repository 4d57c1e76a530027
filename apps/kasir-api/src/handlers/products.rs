//! `/products`
//!
//! Creating or updating a product with a `price` goes through the price
//! ledger in the same unit of work as the row write.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kasir_core::input::{NewProduct, ProductPatch};
use kasir_core::ProductDetail;
use kasir_db::ProductQuery;
use serde::{Deserialize, Serialize};

use super::{message, ListParams, Message};
use crate::error::ApiResult;
use crate::extract::{entity_id, ApiJson, ApiPath, ApiQuery};
use crate::AppState;

const ENTITY: &str = "Product";

/// `?search&categoryId&limit&page`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductParams {
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<ProductDetail>,
    pub total: i64,
    pub page: u32,
    pub pages: u32,
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ProductParams>,
) -> ApiResult<Json<ProductList>> {
    let category_id = match params.category_id {
        Some(id) if !id.trim().is_empty() => Some(entity_id("Category", id)?),
        _ => None,
    };

    let list = ListParams {
        search: params.search,
        limit: params.limit,
        page: params.page,
    };
    let query = ProductQuery {
        search: list.search()?,
        category_id,
        pagination: list.pagination()?,
    };
    let page = state.db.products().list(&query).await?;

    Ok(Json(ProductList {
        products: page.items,
        total: page.total,
        page: page.page,
        pages: page.pages,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<ProductDetail>> {
    let id = entity_id(ENTITY, id)?;
    Ok(Json(state.db.products().get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<ProductDetail>)> {
    let product = state.db.products().create(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Json<ProductDetail>> {
    let id = entity_id(ENTITY, id)?;
    Ok(Json(state.db.products().update(&id, &patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Message>> {
    let id = entity_id(ENTITY, id)?;
    state.db.products().delete(&id).await?;
    Ok(message("Product removed successfully."))
}
