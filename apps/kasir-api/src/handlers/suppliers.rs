//! `/suppliers`

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kasir_core::input::{NewSupplier, SupplierPatch};
use kasir_core::Supplier;
use serde::Serialize;

use super::{message, ListParams, Message};
use crate::error::ApiResult;
use crate::extract::{entity_id, ApiJson, ApiPath, ApiQuery};
use crate::AppState;

const ENTITY: &str = "Supplier";

#[derive(Debug, Serialize)]
pub struct SupplierList {
    pub suppliers: Vec<Supplier>,
    pub total: i64,
    pub page: u32,
    pub pages: u32,
}

/// `?search` matches name or contact person, case-insensitively.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<SupplierList>> {
    let pagination = params.pagination()?;
    let search = params.search()?;

    let page = state
        .db
        .suppliers()
        .list(search.as_deref(), pagination)
        .await?;

    Ok(Json(SupplierList {
        suppliers: page.items,
        total: page.total,
        page: page.page,
        pages: page.pages,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Supplier>> {
    let id = entity_id(ENTITY, id)?;
    Ok(Json(state.db.suppliers().get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewSupplier>,
) -> ApiResult<(StatusCode, Json<Supplier>)> {
    let supplier = state.db.suppliers().create(&input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<SupplierPatch>,
) -> ApiResult<Json<Supplier>> {
    let id = entity_id(ENTITY, id)?;
    Ok(Json(state.db.suppliers().update(&id, &patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Message>> {
    let id = entity_id(ENTITY, id)?;
    state.db.suppliers().delete(&id).await?;
    Ok(message("Supplier removed successfully."))
}
