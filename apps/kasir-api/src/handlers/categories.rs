//! `/categories`

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kasir_core::input::{CategoryPatch, NewCategory};
use kasir_core::Category;

use super::{message, Message};
use crate::error::ApiResult;
use crate::extract::{entity_id, ApiJson, ApiPath};
use crate::AppState;

const ENTITY: &str = "Category";

/// All categories, by name.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Category>> {
    let id = entity_id(ENTITY, id)?;
    Ok(Json(state.db.categories().get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewCategory>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = state.db.categories().create(&input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<CategoryPatch>,
) -> ApiResult<Json<Category>> {
    let id = entity_id(ENTITY, id)?;
    Ok(Json(state.db.categories().update(&id, &patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Message>> {
    let id = entity_id(ENTITY, id)?;
    state.db.categories().delete(&id).await?;
    Ok(message("Category removed successfully."))
}
