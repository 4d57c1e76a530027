//! `/products/:id/suppliers`
//!
//! A link is addressed by its product and supplier; a product can be
//! linked to each supplier once.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kasir_core::input::{NewProductSupplier, ProductSupplierPatch};
use kasir_core::ProductSupplierDetail;

use super::{message, Message};
use crate::error::ApiResult;
use crate::extract::{entity_id, ApiJson, ApiPath};
use crate::AppState;

fn link_ids(product_id: String, supplier_id: String) -> ApiResult<(String, String)> {
    Ok((
        entity_id("Product", product_id)?,
        entity_id("Supplier", supplier_id)?,
    ))
}

pub async fn list(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<String>,
) -> ApiResult<Json<Vec<ProductSupplierDetail>>> {
    let product_id = entity_id("Product", product_id)?;
    Ok(Json(state.db.product_suppliers().list(&product_id).await?))
}

pub async fn get(
    State(state): State<AppState>,
    ApiPath((product_id, supplier_id)): ApiPath<(String, String)>,
) -> ApiResult<Json<ProductSupplierDetail>> {
    let (product_id, supplier_id) = link_ids(product_id, supplier_id)?;
    Ok(Json(
        state
            .db
            .product_suppliers()
            .get(&product_id, &supplier_id)
            .await?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<String>,
    ApiJson(input): ApiJson<NewProductSupplier>,
) -> ApiResult<(StatusCode, Json<ProductSupplierDetail>)> {
    let product_id = entity_id("Product", product_id)?;
    let link = state
        .db
        .product_suppliers()
        .create(&product_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath((product_id, supplier_id)): ApiPath<(String, String)>,
    ApiJson(patch): ApiJson<ProductSupplierPatch>,
) -> ApiResult<Json<ProductSupplierDetail>> {
    let (product_id, supplier_id) = link_ids(product_id, supplier_id)?;
    Ok(Json(
        state
            .db
            .product_suppliers()
            .update(&product_id, &supplier_id, &patch)
            .await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath((product_id, supplier_id)): ApiPath<(String, String)>,
) -> ApiResult<Json<Message>> {
    let (product_id, supplier_id) = link_ids(product_id, supplier_id)?;
    state
        .db
        .product_suppliers()
        .delete(&product_id, &supplier_id)
        .await?;
    Ok(message("Product-supplier link removed successfully."))
}
