//! # Transaction Repository
//!
//! Reads of completed transactions with their items, plus the insert used
//! by the checkout workflow.
//!
//! Transactions are written once and never updated; items keep the order in
//! which they were rung up (`line_no`).

use chrono::{DateTime, Utc};
use kasir_core::{
    CoreError, EntityRef, Page, Pagination, PaymentMethod, PricedLine, Transaction,
    TransactionDetail, TransactionFilter, TransactionItem, TransactionItemDetail,
    TransactionStatus,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult, ServiceResult};
use crate::repository::parse_money;

const ENTITY: &str = "Transaction";

const SELECT_TRANSACTION: &str = r#"
    SELECT
        t.id,
        t.invoice_code,
        t.transaction_type_id,
        t.cashier_id,
        t.total_amount,
        t.payment_method,
        t.amount_paid,
        t.change_due,
        t.status,
        t.created_at,
        tt.name AS transaction_type_name
    FROM transactions t
    JOIN transaction_types tt ON tt.id = t.transaction_type_id
"#;

const FILTER_CLAUSE: &str = r#"
    WHERE (?1 IS NULL OR t.cashier_id = ?1)
      AND (?2 IS NULL OR t.transaction_type_id = ?2)
      AND (?3 IS NULL OR t.created_at >= ?3)
      AND (?4 IS NULL OR t.created_at < ?4)
"#;

#[derive(Debug, sqlx::FromRow)]
struct TransactionRecord {
    id: String,
    invoice_code: String,
    transaction_type_id: String,
    cashier_id: Option<String>,
    total_amount: String,
    payment_method: PaymentMethod,
    amount_paid: String,
    change_due: String,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
    transaction_type_name: String,
}

impl TransactionRecord {
    fn into_parts(self) -> DbResult<(Transaction, EntityRef)> {
        let transaction = Transaction {
            total_amount: parse_money("transactions.total_amount", &self.total_amount)?,
            amount_paid: parse_money("transactions.amount_paid", &self.amount_paid)?,
            change_due: parse_money("transactions.change_due", &self.change_due)?,
            id: self.id,
            invoice_code: self.invoice_code,
            transaction_type_id: self.transaction_type_id.clone(),
            cashier_id: self.cashier_id,
            payment_method: self.payment_method,
            status: self.status,
            created_at: self.created_at,
        };
        let transaction_type = EntityRef {
            id: self.transaction_type_id,
            name: self.transaction_type_name,
        };
        Ok((transaction, transaction_type))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRecord {
    id: String,
    transaction_id: String,
    product_id: String,
    quantity: i64,
    price: String,
    subtotal: String,
    product_name: String,
}

impl TryFrom<ItemRecord> for TransactionItemDetail {
    type Error = DbError;

    fn try_from(r: ItemRecord) -> DbResult<Self> {
        Ok(TransactionItemDetail {
            product: EntityRef {
                id: r.product_id.clone(),
                name: r.product_name,
            },
            item: TransactionItem {
                price: parse_money("transaction_items.price", &r.price)?,
                subtotal: parse_money("transaction_items.subtotal", &r.subtotal)?,
                id: r.id,
                transaction_id: r.transaction_id,
                product_id: r.product_id,
                quantity: r.quantity,
            },
        })
    }
}

// =============================================================================
// Connection-level operations
// =============================================================================

async fn items_in(
    conn: &mut SqliteConnection,
    transaction_id: &str,
) -> DbResult<Vec<TransactionItemDetail>> {
    let rows = sqlx::query_as::<_, ItemRecord>(
        r#"
        SELECT i.id, i.transaction_id, i.product_id, i.quantity, i.price, i.subtotal,
               p.name AS product_name
        FROM transaction_items i
        JOIN products p ON p.id = i.product_id
        WHERE i.transaction_id = ?1
        ORDER BY i.line_no
        "#,
    )
    .bind(transaction_id)
    .fetch_all(conn)
    .await?;

    rows.into_iter().map(TransactionItemDetail::try_from).collect()
}

async fn with_items(
    conn: &mut SqliteConnection,
    record: TransactionRecord,
) -> DbResult<TransactionDetail> {
    let (transaction, transaction_type) = record.into_parts()?;
    let items = items_in(conn, &transaction.id).await?;
    Ok(TransactionDetail {
        transaction,
        transaction_type,
        items,
    })
}

/// A transaction with its type and items, read on the given connection.
pub(crate) async fn detail_in(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<TransactionDetail>> {
    let record = sqlx::query_as::<_, TransactionRecord>(&format!("{SELECT_TRANSACTION} WHERE t.id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match record {
        Some(record) => Ok(Some(with_items(conn, record).await?)),
        None => Ok(None),
    }
}

/// Writes the transaction row and one item row per priced line, in order.
pub(crate) async fn insert_in(
    conn: &mut SqliteConnection,
    transaction: &Transaction,
    lines: &[PricedLine],
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, invoice_code, transaction_type_id, cashier_id, total_amount,
            payment_method, amount_paid, change_due, status, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&transaction.id)
    .bind(&transaction.invoice_code)
    .bind(&transaction.transaction_type_id)
    .bind(&transaction.cashier_id)
    .bind(transaction.total_amount.to_storage_string())
    .bind(transaction.payment_method)
    .bind(transaction.amount_paid.to_storage_string())
    .bind(transaction.change_due.to_storage_string())
    .bind(transaction.status)
    .bind(transaction.created_at)
    .execute(&mut *conn)
    .await?;

    for (line_no, line) in lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO transaction_items (
                id, transaction_id, line_no, product_id, quantity, price, subtotal
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(kasir_core::new_id())
        .bind(&transaction.id)
        .bind(line_no as i64)
        .bind(&line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price.to_storage_string())
        .bind(line.subtotal.to_storage_string())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// TransactionRepository
// =============================================================================

#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// One page of transactions, newest first, each with its items.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> ServiceResult<Page<TransactionDetail>> {
        debug!(?filter, page = pagination.page, "Listing transactions");

        let mut conn = self.pool.acquire().await?;

        let records = sqlx::query_as::<_, TransactionRecord>(&format!(
            "{SELECT_TRANSACTION} {FILTER_CLAUSE} \
             ORDER BY t.created_at DESC, t.rowid DESC LIMIT ?5 OFFSET ?6"
        ))
        .bind(&filter.cashier_id)
        .bind(&filter.transaction_type_id)
        .bind(filter.from)
        .bind(filter.until)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(&mut *conn)
        .await?;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM transactions t {FILTER_CLAUSE}"))
                .bind(&filter.cashier_id)
                .bind(&filter.transaction_type_id)
                .bind(filter.from)
                .bind(filter.until)
                .fetch_one(&mut *conn)
                .await?;

        let mut transactions = Vec::with_capacity(records.len());
        for record in records {
            transactions.push(with_items(&mut conn, record).await?);
        }

        Ok(Page::new(transactions, total, pagination))
    }

    pub async fn get(&self, id: &str) -> ServiceResult<TransactionDetail> {
        let mut conn = self.pool.acquire().await?;
        detail_in(&mut conn, id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id).into())
    }

    pub async fn count(&self) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{CheckoutSettings, TransactionWorkflow};
    use crate::error::ServiceError;
    use crate::repository::test_support::{category, product, sale_type, test_db};
    use chrono::Duration;
    use kasir_core::input::{CartLine, CheckoutRequest};
    use kasir_core::Money;

    fn request(product_id: &str, type_id: &str, cashier: Option<&str>) -> CheckoutRequest {
        CheckoutRequest {
            items: vec![CartLine {
                product_id: product_id.to_string(),
                quantity: 1,
            }],
            payment_method: PaymentMethod::Qris,
            amount_paid: Money::from_units(25000),
            transaction_type_id: type_id.to_string(),
            cashier_id: cashier.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_list_newest_first_with_filters() {
        let db = test_db().await;
        let t = sale_type(&db).await;
        let cat = category(&db, "Minuman").await;
        let p = product(&db, &cat, "Kopi Susu", Some(25000)).await;
        let workflow = TransactionWorkflow::new(&db, CheckoutSettings::default());

        let first = workflow
            .create_transaction(&request(&p.product.id, &t.id, Some("kasir-1")))
            .await
            .unwrap();
        let second = workflow
            .create_transaction(&request(&p.product.id, &t.id, Some("kasir-2")))
            .await
            .unwrap();

        let repo = db.transactions();

        let all = repo
            .list(&TransactionFilter::default(), Pagination::default())
            .await
            .unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.items[0].transaction.id, second.transaction.id);
        assert_eq!(all.items[1].transaction.id, first.transaction.id);
        assert_eq!(all.items[0].items.len(), 1);
        assert_eq!(all.items[0].transaction.payment_method, PaymentMethod::Qris);

        let by_cashier = repo
            .list(
                &TransactionFilter {
                    cashier_id: Some("kasir-1".into()),
                    ..Default::default()
                },
                Pagination::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_cashier.total, 1);
        assert_eq!(by_cashier.items[0].transaction.id, first.transaction.id);

        let future = repo
            .list(
                &TransactionFilter {
                    from: Some(Utc::now() + Duration::days(1)),
                    ..Default::default()
                },
                Pagination::default(),
            )
            .await
            .unwrap();
        assert_eq!(future.total, 0);

        let window = repo
            .list(
                &TransactionFilter {
                    from: Some(Utc::now() - Duration::days(1)),
                    until: Some(Utc::now() + Duration::days(1)),
                    transaction_type_id: Some(t.id.clone()),
                    ..Default::default()
                },
                Pagination { limit: 1, page: 2 },
            )
            .await
            .unwrap();
        assert_eq!(window.total, 2);
        assert_eq!(window.pages, 2);
        assert_eq!(window.items.len(), 1);
        assert_eq!(window.items[0].transaction.id, first.transaction.id);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = test_db().await;
        let err = db.transactions().get(&kasir_core::new_id()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::NotFound { .. })));
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }
}
