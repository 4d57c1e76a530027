//! # Database Error Types
//!
//! Error types for storage operations and the services built on them.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← constraint kind, busy/locked, decode failures                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError = Core(CoreError) | Db(DbError)                           │
//! │       │          (repositories turn known constraint failures into      │
//! │       │           CoreError::DuplicateName / ReferentialConflict)       │
//! │       ▼                                                                 │
//! │  ApiError (kasir-api) ← status code + {msg}                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kasir_core::{CoreError, ValidationError};
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Storage-level failures.
#[derive(Debug, Error)]
pub enum DbError {
    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate category/supplier/product/transaction type name
    /// - Second link between the same product and supplier
    /// - Two checkouts racing for the same invoice code
    /// - A second open price row for one product
    #[error("Duplicate value for {field}")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Deleting a row that is still referenced (RESTRICT)
    /// - Inserting a row pointing at a missing parent
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created or opened
    /// - File permissions issue
    /// - Pool already closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other statement failure (CHECK, NOT NULL, syntax).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin/commit/rollback failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Another writer holds the database lock.
    #[error("Database is busy")]
    Busy,

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored value could not be turned back into a domain value.
    #[error("Corrupt stored value: {0}")]
    Decode(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field } if field.ends_with(column))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// Database(kind = UniqueViolation)      → UniqueViolation { "table.column" }
/// Database(kind = ForeignKeyViolation)  → ForeignKeyViolation
/// Database("FOREIGN KEY constraint failed")
///                                       → ForeignKeyViolation
/// Database("database is locked")        → Busy
/// PoolTimedOut                          → PoolExhausted
/// PoolClosed / Io                       → ConnectionFailed
/// ColumnDecode / Decode                 → Decode
/// Other                                 → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                match db_err.kind() {
                    // "UNIQUE constraint failed: transactions.invoice_code"
                    ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        field: msg
                            .split("constraint failed: ")
                            .nth(1)
                            .unwrap_or("unknown")
                            .to_string(),
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    },
                    // RESTRICT and end-of-statement FK checks come back as a
                    // plain SQLITE_CONSTRAINT (19) with no extended code.
                    _ if is_foreign_key_message(msg) => DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    },
                    _ if msg.contains("database is locked") || msg.contains("database is busy") => {
                        DbError::Busy
                    }
                    _ => DbError::QueryFailed(msg.to_string()),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DbError::Decode(err.to_string())
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

fn is_foreign_key_message(msg: &str) -> bool {
    msg.contains("FOREIGN KEY constraint failed")
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Service Error
// =============================================================================

/// What repositories and workflows return: a business rule failed, or the
/// store did.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl ServiceError {
    /// Failures worth retrying with a fresh unit of work: a lost race for
    /// an invoice code, or a locked database.
    pub fn is_retryable_conflict(&self) -> bool {
        match self {
            ServiceError::Db(DbError::Busy) => true,
            ServiceError::Db(err) => err.is_unique_violation_on("transactions.invoice_code"),
            ServiceError::Core(_) => false,
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Db(err.into())
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(err.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================
