//! # Kasir API
//!
//! HTTP JSON server for the Kasir point-of-sale backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Kasir API Routes                              │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Catalog       │  │  Products      │  │  Transactions              ││
//! │  │                │  │                │  │                            ││
//! │  │ • /categories  │  │ • /products    │  │ • POST /transactions       ││
//! │  │ • /suppliers   │  │ • price ledger │  │ • GET  /transactions       ││
//! │  │ • /transaction-│  │ • supplier     │  │ • GET  /transactions/:id   ││
//! │  │   types        │  │   links        │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  AppState: Database (SQLite pool) + TransactionWorkflow          │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `PORT` - HTTP port (default: 5000)
//! - `DATABASE_PATH` - SQLite file (default: kasir.db)
//! - `KASIR__ALLOW_UNDERPAYMENT` - accept `amountPaid < totalAmount` (default: true)
//! - `KASIR__INVOICE_RETRY_ATTEMPTS` - checkout attempts on invoice contention (default: 3)
//! - `RUST_LOG` - log filter (default: `info,kasir=debug,sqlx=warn`)

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod telemetry;

use axum::routing::{get, post};
use axum::Router;
use kasir_db::{CheckoutSettings, Database, TransactionWorkflow};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub workflow: TransactionWorkflow,
}

impl AppState {
    pub fn new(db: Database, settings: CheckoutSettings) -> Self {
        let workflow = TransactionWorkflow::new(&db, settings);
        AppState { db, workflow }
    }
}

/// All routes, with request tracing and permissive CORS.
pub fn build_router(state: AppState) -> Router {
    use handlers::{
        categories, health, price_history, product_suppliers, products, suppliers,
        transaction_types, transactions,
    };

    Router::new()
        .route("/api", get(health::root))
        .route("/health", get(health::health))
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/:id",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/suppliers", get(suppliers::list).post(suppliers::create))
        .route(
            "/suppliers/:id",
            get(suppliers::get)
                .put(suppliers::update)
                .delete(suppliers::delete),
        )
        .route(
            "/transaction-types",
            get(transaction_types::list).post(transaction_types::create),
        )
        .route(
            "/transaction-types/:id",
            get(transaction_types::get)
                .put(transaction_types::update)
                .delete(transaction_types::delete),
        )
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/:id",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/products/:id/price-histories", get(price_history::list))
        .route("/products/:id/price-history", post(price_history::create))
        .route(
            "/products/:id/suppliers",
            get(product_suppliers::list).post(product_suppliers::create),
        )
        .route(
            "/products/:id/suppliers/:supplier_id",
            get(product_suppliers::get)
                .put(product_suppliers::update)
                .delete(product_suppliers::delete),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/:id", get(transactions::get))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
