//! # Price Ledger
//!
//! Append-only price history per product, with at most one open entry.
//!
//! ## setPrice
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set_price(product, 27000)                                             │
//! │                                                                         │
//! │  open entry?                                                            │
//! │    ├── none            → INSERT {27000, start=now, end=NULL}            │
//! │    ├── 27000 (equal)   → no write, PriceChange::Unchanged               │
//! │    └── 25000 (differs) → UPDATE open SET end=now                        │
//! │                          INSERT {27000, start=now, end=NULL}            │
//! │                          (same unit of work)                            │
//! │                                                                         │
//! │  price_histories                                                        │
//! │  ┌────────┬────────────┬────────────┐                                   │
//! │  │ price  │ start      │ end        │                                   │
//! │  ├────────┼────────────┼────────────┤                                   │
//! │  │ 27000  │ 10:05      │ NULL       │ ← current                         │
//! │  │ 25000  │ 09:00      │ 10:05      │                                   │
//! │  └────────┴────────────┴────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A partial unique index on `(product_id) WHERE end_date IS NULL` backs the
//! single-open-entry rule at the storage level.
//!
//! The `*_in` functions take the caller's connection so product writes and
//! checkout can run them inside their own unit of work.

use chrono::{DateTime, Utc};
use kasir_core::validation::validate_money;
use kasir_core::{new_id, CoreError, Money, Page, Pagination, PriceHistory};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument};

use crate::error::{DbError, DbResult, ServiceError, ServiceResult};
use crate::repository::{parse_money, row_exists};
use crate::unit_of_work::UnitOfWork;

const SELECT_ENTRY: &str = r#"
    SELECT id, product_id, price, start_date, end_date
    FROM price_histories
"#;

#[derive(Debug, sqlx::FromRow)]
struct PriceHistoryRecord {
    id: String,
    product_id: String,
    price: String,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
}

impl TryFrom<PriceHistoryRecord> for PriceHistory {
    type Error = DbError;

    fn try_from(r: PriceHistoryRecord) -> DbResult<Self> {
        Ok(PriceHistory {
            price: parse_money("price_histories.price", &r.price)?,
            id: r.id,
            product_id: r.product_id,
            start_date: r.start_date,
            end_date: r.end_date,
        })
    }
}

/// Outcome of a `set_price` call.
#[derive(Debug, Clone)]
pub enum PriceChange {
    /// The requested price equals the current one; nothing was written.
    Unchanged(PriceHistory),
    /// A new open entry was written, closing `closed` if there was one.
    Changed {
        entry: PriceHistory,
        closed: Option<PriceHistory>,
    },
}

impl PriceChange {
    pub fn is_changed(&self) -> bool {
        matches!(self, PriceChange::Changed { .. })
    }

    /// The entry that is open after the call.
    pub fn current(&self) -> &PriceHistory {
        match self {
            PriceChange::Unchanged(entry) => entry,
            PriceChange::Changed { entry, .. } => entry,
        }
    }
}

// =============================================================================
// Connection-level operations
// =============================================================================

/// The open entry for a product, if any.
pub(crate) async fn open_entry(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Option<PriceHistory>> {
    let row = sqlx::query_as::<_, PriceHistoryRecord>(&format!(
        "{SELECT_ENTRY} WHERE product_id = ?1 AND end_date IS NULL \
         ORDER BY start_date DESC, rowid DESC LIMIT 1"
    ))
    .bind(product_id)
    .fetch_optional(conn)
    .await?;

    row.map(PriceHistory::try_from).transpose()
}

/// Current price of a product.
///
/// ## Errors
/// - `ProductNotFound` if the product doesn't exist
/// - `NoPriceDefined` if it exists but has no open entry
pub async fn current_price_in(conn: &mut SqliteConnection, product_id: &str) -> ServiceResult<Money> {
    if let Some(entry) = open_entry(conn, product_id).await? {
        return Ok(entry.price);
    }

    if row_exists(conn, "products", product_id).await? {
        Err(CoreError::NoPriceDefined(product_id.to_string()).into())
    } else {
        Err(CoreError::ProductNotFound(product_id.to_string()).into())
    }
}

/// Sets a product's price as of `now`. Idempotent for an unchanged price.
pub async fn set_price_in(
    conn: &mut SqliteConnection,
    product_id: &str,
    price: Money,
    now: DateTime<Utc>,
) -> ServiceResult<PriceChange> {
    validate_money("Price", price)?;

    let current = open_entry(conn, product_id).await?;
    if current.is_none() && !row_exists(conn, "products", product_id).await? {
        return Err(CoreError::ProductNotFound(product_id.to_string()).into());
    }

    if let Some(open) = &current {
        if open.price == price {
            debug!(product_id = %product_id, price = %price, "Price unchanged");
            return Ok(PriceChange::Unchanged(open.clone()));
        }
    }

    let closed = match current {
        Some(mut open) => {
            sqlx::query("UPDATE price_histories SET end_date = ?2 WHERE id = ?1")
                .bind(&open.id)
                .bind(now)
                .execute(&mut *conn)
                .await?;
            open.end_date = Some(now);
            Some(open)
        }
        None => None,
    };

    let entry = PriceHistory {
        id: new_id(),
        product_id: product_id.to_string(),
        price: price.rounded().into(),
        start_date: now,
        end_date: None,
    };

    sqlx::query(
        r#"
        INSERT INTO price_histories (id, product_id, price, start_date, end_date)
        VALUES (?1, ?2, ?3, ?4, NULL)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.product_id)
    .bind(entry.price.to_storage_string())
    .bind(entry.start_date)
    .execute(&mut *conn)
    .await?;

    info!(
        product_id = %product_id,
        old_price = ?closed.as_ref().map(|c| c.price.to_string()),
        new_price = %entry.price,
        "Price changed"
    );

    Ok(PriceChange::Changed { entry, closed })
}

/// `ProductNotFound` means the addressed resource is missing when the
/// product id comes from the URL.
fn as_addressed(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Core(CoreError::ProductNotFound(id)) => {
            CoreError::not_found("Product", id).into()
        }
        other => other,
    }
}

// =============================================================================
// PriceLedger
// =============================================================================

/// Pool-level price ledger operations, each in its own unit of work.
#[derive(Debug, Clone)]
pub struct PriceLedger {
    pool: SqlitePool,
}

impl PriceLedger {
    pub fn new(pool: SqlitePool) -> Self {
        PriceLedger { pool }
    }

    pub async fn current_price(&self, product_id: &str) -> ServiceResult<Money> {
        let mut conn = self.pool.acquire().await?;
        current_price_in(&mut conn, product_id).await
    }

    /// Appends a price entry. Close-then-insert commits or rolls back as one.
    #[instrument(skip(self))]
    pub async fn set_price(&self, product_id: &str, price: Money) -> ServiceResult<PriceChange> {
        let mut uow = UnitOfWork::begin_immediate(&self.pool).await?;
        let change = set_price_in(uow.conn(), product_id, price, Utc::now())
            .await
            .map_err(as_addressed)?;

        if change.is_changed() {
            uow.commit().await?;
        }
        Ok(change)
    }

    /// History newest first. Empty for a product that never had a price.
    pub async fn list_history(
        &self,
        product_id: &str,
        pagination: Pagination,
    ) -> ServiceResult<Page<PriceHistory>> {
        let mut conn = self.pool.acquire().await?;

        if !row_exists(&mut conn, "products", product_id).await? {
            return Err(CoreError::not_found("Product", product_id).into());
        }

        let rows = sqlx::query_as::<_, PriceHistoryRecord>(&format!(
            "{SELECT_ENTRY} WHERE product_id = ?1 \
             ORDER BY start_date DESC, rowid DESC LIMIT ?2 OFFSET ?3"
        ))
        .bind(product_id)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(&mut *conn)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM price_histories WHERE product_id = ?1")
                .bind(product_id)
                .fetch_one(&mut *conn)
                .await?;

        let entries = rows
            .into_iter()
            .map(PriceHistory::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page::new(entries, total, pagination))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Database;
    use crate::repository::test_support::{category, product, test_db};

    async fn open_count(db: &Database, product_id: &str) -> i64 {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM price_histories WHERE product_id = ?1 AND end_date IS NULL",
        )
        .bind(product_id)
        .fetch_one(db.pool())
        .await
        .unwrap()
    }

    async fn row_count(db: &Database, product_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM price_histories WHERE product_id = ?1")
            .bind(product_id)
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_price_opens_entry() {
        let db = test_db().await;
        let cat = category(&db, "Minuman").await;
        let p = product(&db, &cat, "Kopi Susu", None).await;
        let ledger = db.price_ledger();

        let err = ledger.current_price(&p.product.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::NoPriceDefined(_))));

        let change = ledger
            .set_price(&p.product.id, Money::from_units(25000))
            .await
            .unwrap();
        assert!(change.is_changed());
        assert!(change.current().is_open());

        assert_eq!(
            ledger.current_price(&p.product.id).await.unwrap(),
            Money::from_units(25000)
        );
    }

    #[tokio::test]
    async fn test_same_price_twice_is_noop() {
        let db = test_db().await;
        let cat = category(&db, "Minuman").await;
        let p = product(&db, &cat, "Kopi Susu", Some(25000)).await;
        let ledger = db.price_ledger();

        let same: Money = "25000.00".parse().unwrap();
        let change = ledger.set_price(&p.product.id, same).await.unwrap();
        assert!(!change.is_changed());
        let change = ledger.set_price(&p.product.id, same).await.unwrap();
        assert!(!change.is_changed());

        assert_eq!(row_count(&db, &p.product.id).await, 1);
        assert_eq!(open_count(&db, &p.product.id).await, 1);
    }

    #[tokio::test]
    async fn test_new_price_closes_previous() {
        let db = test_db().await;
        let cat = category(&db, "Minuman").await;
        let p = product(&db, &cat, "Kopi Susu", Some(25000)).await;
        let ledger = db.price_ledger();

        let change = ledger
            .set_price(&p.product.id, Money::from_units(27000))
            .await
            .unwrap();

        match change {
            PriceChange::Changed { entry, closed } => {
                let closed = closed.unwrap();
                assert_eq!(closed.price, Money::from_units(25000));
                assert_eq!(closed.end_date, Some(entry.start_date));
                assert!(entry.is_open());
            }
            PriceChange::Unchanged(_) => panic!("expected a change"),
        }

        assert_eq!(open_count(&db, &p.product.id).await, 1);
        assert_eq!(row_count(&db, &p.product.id).await, 2);
        assert_eq!(
            ledger.current_price(&p.product.id).await.unwrap(),
            Money::from_units(27000)
        );
    }

    #[tokio::test]
    async fn test_history_newest_first_and_paginated() {
        let db = test_db().await;
        let cat = category(&db, "Minuman").await;
        let p = product(&db, &cat, "Kopi Susu", Some(20000)).await;
        let ledger = db.price_ledger();

        for price in [21000, 22000, 23000] {
            ledger
                .set_price(&p.product.id, Money::from_units(price))
                .await
                .unwrap();
        }

        let page = ledger
            .list_history(&p.product.id, Pagination { limit: 3, page: 1 })
            .await
            .unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.pages, 2);
        let prices: Vec<_> = page.items.iter().map(|e| e.price.to_string()).collect();
        assert_eq!(prices, ["23000.00", "22000.00", "21000.00"]);
        assert!(page.items[0].is_open());
        assert!(!page.items[1].is_open());
    }

    #[tokio::test]
    async fn test_history_empty_vs_missing_product() {
        let db = test_db().await;
        let cat = category(&db, "Minuman").await;
        let p = product(&db, &cat, "Kopi Susu", None).await;
        let ledger = db.price_ledger();

        let page = ledger
            .list_history(&p.product.id, Pagination::default())
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);

        let err = ledger
            .list_history(&new_id(), Pagination::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_missing_product() {
        let db = test_db().await;
        let ledger = db.price_ledger();
        let id = new_id();

        let err = ledger.current_price(&id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::ProductNotFound(_))));

        let err = ledger
            .set_price(&id, Money::from_units(1000))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_decimal_equality_not_text_equality() {
        let db = test_db().await;
        let cat = category(&db, "Camilan").await;
        let p = product(&db, &cat, "Keripik", None).await;
        let ledger = db.price_ledger();

        ledger
            .set_price(&p.product.id, "0.3".parse().unwrap())
            .await
            .unwrap();
        let change = ledger
            .set_price(&p.product.id, "0.30".parse().unwrap())
            .await
            .unwrap();
        assert!(!change.is_changed());
    }
}
