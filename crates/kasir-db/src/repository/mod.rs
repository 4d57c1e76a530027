//! # Repository Module
//!
//! Database repositories for Kasir's CRUD resources.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │  db.categories().create(&input)                                 │
//! │       ▼                                                                 │
//! │  CategoryRepository                                                    │
//! │  ├── validate input            (kasir-core rules)                      │
//! │  ├── run SQL                   (XRecord rows via sqlx::FromRow)        │
//! │  └── map constraint failures   (UNIQUE → DuplicateName,               │
//! │       │                          FK RESTRICT → ReferentialConflict)     │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads that a unit of work also needs are written as free functions over
//! `&mut SqliteConnection`; the pool-level methods acquire a connection and
//! call the same function.
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository)
//! - [`SupplierRepository`](supplier::SupplierRepository)
//! - [`TransactionTypeRepository`](transaction_type::TransactionTypeRepository)
//! - [`ProductRepository`](product::ProductRepository)
//! - [`ProductSupplierRepository`](product_supplier::ProductSupplierRepository)
//! - [`TransactionRepository`](transaction::TransactionRepository)

pub mod category;
pub mod product;
pub mod product_supplier;
pub mod supplier;
pub mod transaction;
pub mod transaction_type;

use kasir_core::{CoreError, Money};
use sqlx::SqliteConnection;

use crate::error::{DbError, DbResult, ServiceError};

/// Parses a money column stored as canonical decimal text.
pub(crate) fn parse_money(column: &'static str, text: &str) -> DbResult<Money> {
    Money::from_storage(text).map_err(|e| DbError::Decode(format!("{column} = {text:?}: {e}")))
}

pub(crate) fn parse_optional_money(column: &'static str, text: Option<&str>) -> DbResult<Option<Money>> {
    text.map(|t| parse_money(column, t)).transpose()
}

/// Maps a UNIQUE violation to the given business error; anything else stays
/// a storage error.
pub(crate) fn on_unique(err: sqlx::Error, conflict: impl FnOnce() -> CoreError) -> ServiceError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => conflict().into(),
        other => other.into(),
    }
}

/// Maps a RESTRICT foreign key failure on delete to `ReferentialConflict`.
pub(crate) fn on_restrict(
    err: sqlx::Error,
    entity: &'static str,
    dependents: &'static str,
) -> ServiceError {
    match DbError::from(err) {
        DbError::ForeignKeyViolation { .. } => {
            CoreError::ReferentialConflict { entity, dependents }.into()
        }
        other => other.into(),
    }
}

/// `SELECT EXISTS` on a primary key.
pub(crate) async fn row_exists(
    conn: &mut SqliteConnection,
    table: &'static str,
    id: &str,
) -> DbResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)");
    let exists: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(conn).await?;
    Ok(exists)
}

/// `%term%` for a `LIKE ... ESCAPE '\'` clause, with wildcards in the term
/// matched literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
