//! `/transactions`
//!
//! ## Checkout
//! ```text
//! POST /transactions {items, paymentMethod, amountPaid, transactionTypeId}
//!      │
//!      ▼
//! TransactionWorkflow::create_transaction
//!      │
//!      ├── Ok   → 201 transaction with items, totals and invoice code
//!      └── Err  → 400 {msg}  (unknown product, no price, bad type, ...)
//!                 500 {msg: "Server Error"}
//! ```
//!
//! The cashier comes from the body, or from `X-Cashier-Id` when an auth
//! gateway in front of the API sets it.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use kasir_core::input::CheckoutRequest;
use kasir_core::{TransactionDetail, TransactionFilter};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extract::{entity_id, ApiJson, ApiPath, ApiQuery};
use crate::AppState;

pub const CASHIER_HEADER: &str = "x-cashier-id";

/// `?cashierId&transactionTypeId&startDate&endDate&limit&page`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
    pub cashier_id: Option<String>,
    pub transaction_type_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TransactionList {
    pub transactions: Vec<TransactionDetail>,
    pub total: i64,
    pub page: u32,
    pub pages: u32,
}

fn parse_day(field: &str, raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid {field} format. Use YYYY-MM-DD.")))
}

fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TransactionParams {
    /// Dates are UTC days; `endDate` covers its whole day.
    fn filter(self) -> ApiResult<TransactionFilter> {
        let transaction_type_id = match non_blank(self.transaction_type_id) {
            Some(id) => Some(entity_id("Transaction Type", id)?),
            None => None,
        };

        let from = match non_blank(self.start_date) {
            Some(raw) => Some(start_of(parse_day("startDate", &raw)?)),
            None => None,
        };

        let until = match non_blank(self.end_date) {
            Some(raw) => {
                let next = parse_day("endDate", &raw)?
                    .succ_opt()
                    .ok_or_else(|| ApiError::BadRequest("endDate is out of range.".to_string()))?;
                Some(start_of(next))
            }
            None => None,
        };

        Ok(TransactionFilter {
            cashier_id: non_blank(self.cashier_id),
            transaction_type_id,
            from,
            until,
        })
    }
}

/// Newest first, each with its type and items.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TransactionParams>,
) -> ApiResult<Json<TransactionList>> {
    let pagination = kasir_core::validation::validate_pagination(params.limit, params.page)?;
    let filter = params.filter()?;

    let page = state.db.transactions().list(&filter, pagination).await?;

    Ok(Json(TransactionList {
        transactions: page.items,
        total: page.total,
        page: page.page,
        pages: page.pages,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<TransactionDetail>> {
    let id = entity_id("Transaction", id)?;
    Ok(Json(state.db.transactions().get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(mut request): ApiJson<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<TransactionDetail>)> {
    if request.cashier_id.is_none() {
        request.cashier_id = headers
            .get(CASHIER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
    }

    let receipt = state.workflow.create_transaction(&request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
