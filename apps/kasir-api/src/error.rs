//! # API Errors
//!
//! Every failure leaves the server as `{"msg": "..."}` with a status code.
//!
//! ## Status Mapping
//! ```text
//! ┌──────────────────────────────────────────┬───────────────────────────┐
//! │ Failure                                  │ Response                  │
//! ├──────────────────────────────────────────┼───────────────────────────┤
//! │ ValidationError, bad JSON/query/path     │ 400 {msg}                 │
//! │ DuplicateName, ReferentialConflict,      │ 400 {msg}                 │
//! │ InvalidReference, ProductNotFound,       │                           │
//! │ NoPriceDefined, InvalidTransactionType,  │                           │
//! │ InsufficientPayment, AmountOverflow      │                           │
//! │ NotFound (the addressed resource)        │ 404 {msg}                 │
//! │ DbError                                  │ 500 {msg: "Server Error"} │
//! └──────────────────────────────────────────┴───────────────────────────┘
//! ```
//!
//! Storage failures are logged in full and never echoed to the client.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kasir_core::{CoreError, ValidationError};
use kasir_db::{DbError, ServiceError};
use serde::Serialize;
use tracing::{error, warn};

/// An HTTP error response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Logged, then reported as a generic server error.
    #[error("Server Error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    msg: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(detail) = &self {
            error!(detail = %detail, "Request failed");
        }
        let body = ErrorBody {
            msg: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(err) => err.into(),
            ServiceError::Db(err) => err.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Rejected request body");
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
