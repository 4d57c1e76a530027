//! # Unit of Work
//!
//! An explicit database transaction: acquire, run a sequence of statements,
//! commit on success. Every other exit path rolls back.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  let mut uow = db.begin().await?;                                      │
//! │                                                                         │
//! │  step_one(uow.conn(), ..).await?;   ── error ──┐                        │
//! │  step_two(uow.conn(), ..).await?;   ── error ──┤                        │
//! │                                                ▼                        │
//! │  uow.commit().await?;               uow dropped → ROLLBACK              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`UnitOfWork::begin`] defers locking until the first write. A unit of work
//! that reads before it writes and must not lose its snapshot to another
//! writer (checkout) starts with [`UnitOfWork::begin_immediate`] instead,
//! which takes the write lock up front and waits out the busy timeout.
//!
//! Statements inside a unit of work must go through [`UnitOfWork::conn`].
//! Reaching for the pool instead would run outside the transaction and, with
//! a single-connection pool, wait forever for the connection held here.

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};

pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool.begin().await.map_err(begin_error)?;
        debug!("Unit of work started");
        Ok(UnitOfWork { tx })
    }

    /// Starts a write transaction (`BEGIN IMMEDIATE`).
    pub async fn begin_immediate(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(begin_error)?;
        debug!("Write unit of work started");
        Ok(UnitOfWork { tx })
    }

    /// The transaction's connection, for use as an executor.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await.map_err(|e| match DbError::from(e) {
            DbError::Busy => DbError::Busy,
            other => DbError::TransactionFailed(format!("commit: {other}")),
        })?;
        debug!("Unit of work committed");
        Ok(())
    }

    /// Explicit rollback. Dropping the unit of work has the same effect.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(format!("rollback: {e}")))?;
        debug!("Unit of work rolled back");
        Ok(())
    }
}

fn begin_error(err: sqlx::Error) -> DbError {
    match DbError::from(err) {
        DbError::Busy => DbError::Busy,
        other => DbError::TransactionFailed(format!("begin: {other}")),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
