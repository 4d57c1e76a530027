//! `/transaction-types`

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kasir_core::input::{NewTransactionType, TransactionTypePatch};
use kasir_core::TransactionType;

use super::{message, Message};
use crate::error::ApiResult;
use crate::extract::{entity_id, ApiJson, ApiPath};
use crate::AppState;

const ENTITY: &str = "Transaction Type";

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<TransactionType>>> {
    Ok(Json(state.db.transaction_types().list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<TransactionType>> {
    let id = entity_id(ENTITY, id)?;
    Ok(Json(state.db.transaction_types().get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewTransactionType>,
) -> ApiResult<(StatusCode, Json<TransactionType>)> {
    let created = state.db.transaction_types().create(&input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<TransactionTypePatch>,
) -> ApiResult<Json<TransactionType>> {
    let id = entity_id(ENTITY, id)?;
    Ok(Json(state.db.transaction_types().update(&id, &patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Message>> {
    let id = entity_id(ENTITY, id)?;
    state.db.transaction_types().delete(&id).await?;
    Ok(message("Transaction type removed successfully."))
}
