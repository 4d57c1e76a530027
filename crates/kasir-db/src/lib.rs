//! # kasir-db: Storage Layer for Kasir
//!
//! SQLite access for the Kasir point-of-sale backend, via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir Data Flow                                  │
//! │                                                                         │
//! │  HTTP handler (POST /api/transactions)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasir-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │   │
//! │  │   │   Database    │   │  Repositories  │   │   Workflows   │   │   │
//! │  │   │   (pool.rs)   │   │  category.rs   │   │ price_ledger  │   │   │
//! │  │   │               │◄──│  product.rs    │   │ invoice       │   │   │
//! │  │   │ SqlitePool    │   │  transaction.rs│   │ checkout      │   │   │
//! │  │   │ UnitOfWork    │   │  ...           │   │               │   │   │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 SQLite (kasir.db, WAL mode)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage and service error types
//! - [`unit_of_work`] - One database transaction spanning several writes
//! - [`repository`] - CRUD for categories, suppliers, types, products, links
//! - [`price_ledger`] - Time-bounded price history per product
//! - [`invoice`] - Daily invoice code sequence
//! - [`checkout`] - The transaction workflow (price, total, persist)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasir_db::{CheckoutSettings, Database, DbConfig, TransactionWorkflow};
//!
//! let db = Database::new(DbConfig::new("kasir.db")).await?;
//! let categories = db.categories().list().await?;
//!
//! let workflow = TransactionWorkflow::new(&db, CheckoutSettings::default());
//! let receipt = workflow.create_transaction(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod invoice;
pub mod migrations;
pub mod pool;
pub mod price_ledger;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutSettings, TransactionWorkflow};
pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig};
pub use price_ledger::{PriceChange, PriceLedger};
pub use unit_of_work::UnitOfWork;

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::product::{ProductQuery, ProductRepository};
pub use repository::product_supplier::ProductSupplierRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::transaction::TransactionRepository;
pub use repository::transaction_type::TransactionTypeRepository;
