//! # Transaction Workflow
//!
//! Turns a validated cart into a persisted transaction.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutRequest                                                       │
//! │       │ validate()                    ── fail → 400, nothing opened     │
//! │       ▼                                                                 │
//! │  ┌──────────────────── unit of work ─────────────────────────────────┐ │
//! │  │ 1. transaction type exists?       ── InvalidTransactionType       │ │
//! │  │ 2. for each line (input order):                                   │ │
//! │  │      current price               ── ProductNotFound / NoPrice     │ │
//! │  │      subtotal = price × qty, total += subtotal                    │ │
//! │  │ 3. change_due = paid − total      (InsufficientPayment if the     │ │
//! │  │                                    store disallows underpayment)  │ │
//! │  │ 4. invoice code for today         INV-YYYYMMDD-NNN                │ │
//! │  │ 5. INSERT transaction + items                                     │ │
//! │  │ 6. read back with type + product names                            │ │
//! │  └──────────────────────────┬────────────────────────────────────────┘ │
//! │                             ▼                                           │
//! │                          COMMIT                                         │
//! │                                                                         │
//! │  The unit of work opens with BEGIN IMMEDIATE, so concurrent checkouts  │
//! │  queue on the write lock and each one numbers its invoice after the    │
//! │  previous one committed.                                                │
//! │                                                                         │
//! │  Any error before COMMIT drops the unit of work: no rows, no invoice    │
//! │  number consumed. A lost race for the invoice code (UNIQUE) or a busy   │
//! │  database retries the whole attempt after a short backoff, up to       │
//! │  `max_attempts`.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, Utc};
use kasir_core::input::CheckoutRequest;
use kasir_core::{new_id, CoreError, PricedCart, Transaction, TransactionDetail, TransactionStatus};
use sqlx::SqlitePool;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::error::{DbError, ServiceResult};
use crate::invoice::next_invoice_code_in;
use crate::pool::Database;
use crate::price_ledger::current_price_in;
use crate::repository::transaction::{detail_in, insert_in};
use crate::repository::transaction_type;
use crate::unit_of_work::UnitOfWork;

const INITIAL_BACKOFF: Duration = Duration::from_millis(25);
const MAX_BACKOFF: Duration = Duration::from_millis(400);

/// Exponential backoff before retry `attempt` (1-based), plus up to 25% jitter.
fn retry_backoff(attempt: u32) -> Duration {
    let base = INITIAL_BACKOFF
        .saturating_mul(1 << attempt.saturating_sub(1).min(8))
        .min(MAX_BACKOFF);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    base + base.mul_f64(0.25 * f64::from(nanos % 1000) / 1000.0)
}

/// Store policy for checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Accept `amount_paid < total`, recording a negative change due.
    pub allow_underpayment: bool,
    /// Attempts per checkout when the invoice code or the database is
    /// contended. At least one attempt is always made.
    pub max_attempts: u32,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            allow_underpayment: true,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransactionWorkflow {
    pool: SqlitePool,
    settings: CheckoutSettings,
}

impl TransactionWorkflow {
    pub fn new(db: &Database, settings: CheckoutSettings) -> Self {
        TransactionWorkflow {
            pool: db.pool().clone(),
            settings,
        }
    }

    pub fn settings(&self) -> CheckoutSettings {
        self.settings
    }

    /// Records a sale.
    ///
    /// ## Errors
    /// - `Validation` before any database work
    /// - `InvalidTransactionType`, `ProductNotFound`, `NoPriceDefined`,
    ///   `InsufficientPayment`, `AmountOverflow` from inside the unit of work
    /// - `Db` for storage failures, including a conflict that outlived
    ///   every retry
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn create_transaction(&self, request: &CheckoutRequest) -> ServiceResult<TransactionDetail> {
        request.validate()?;

        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.attempt(request, Utc::now()).await {
                Err(err) if err.is_retryable_conflict() && attempt < max_attempts => {
                    let backoff = retry_backoff(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Checkout conflict, retrying"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    async fn attempt(
        &self,
        request: &CheckoutRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<TransactionDetail> {
        let mut uow = UnitOfWork::begin_immediate(&self.pool).await?;

        let type_id = request.transaction_type_id.trim();
        let transaction_type = transaction_type::find_in(uow.conn(), type_id)
            .await?
            .ok_or_else(|| CoreError::InvalidTransactionType(type_id.to_string()))?;

        let mut cart = PricedCart::new();
        for line in &request.items {
            let product_id = line.product_id.trim();
            let unit_price = current_price_in(uow.conn(), product_id).await?;
            cart.add_line(product_id, line.quantity, unit_price)?;
        }

        if !self.settings.allow_underpayment {
            cart.ensure_paid(request.amount_paid)?;
        }
        let change_due = cart.change_due(request.amount_paid)?;

        // Invoice dates follow the store's wall clock.
        let business_day = now.with_timezone(&Local).date_naive();
        let invoice_code = next_invoice_code_in(uow.conn(), business_day).await?;

        let transaction = Transaction {
            id: new_id(),
            invoice_code,
            transaction_type_id: transaction_type.id,
            cashier_id: request
                .cashier_id
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            total_amount: cart.total(),
            payment_method: request.payment_method,
            amount_paid: request.amount_paid,
            change_due,
            status: TransactionStatus::default(),
            created_at: now,
        };

        insert_in(uow.conn(), &transaction, cart.lines()).await?;

        let detail = detail_in(uow.conn(), &transaction.id)
            .await?
            .ok_or_else(|| DbError::Internal("transaction vanished before commit".into()))?;

        uow.commit().await?;

        info!(
            invoice_code = %detail.transaction.invoice_code,
            total = %detail.transaction.total_amount,
            change_due = %detail.transaction.change_due,
            "Transaction recorded"
        );
        Ok(detail)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
