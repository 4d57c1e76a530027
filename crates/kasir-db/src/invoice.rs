//! # Invoice Numbering
//!
//! Finds the greatest invoice code issued on a day and derives the next one.
//! Must run on the checkout's unit of work so the lookup and the insert see
//! the same snapshot; the UNIQUE index on `invoice_code` catches the race
//! that remains between two writers.
//!
//! Ordering is by length first, so `INV-20261019-1000` sorts after
//! `INV-20261019-999`.

use chrono::NaiveDate;
use kasir_core::invoice::{date_prefix, next_invoice_code};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

/// Greatest invoice code issued on `date`, if any.
pub async fn last_issued(conn: &mut SqliteConnection, date: NaiveDate) -> DbResult<Option<String>> {
    let pattern = format!("{}-%", date_prefix(date));

    let code: Option<String> = sqlx::query_scalar(
        r#"
        SELECT invoice_code FROM transactions
        WHERE invoice_code LIKE ?1
        ORDER BY LENGTH(invoice_code) DESC, invoice_code DESC
        LIMIT 1
        "#,
    )
    .bind(pattern)
    .fetch_optional(conn)
    .await?;

    Ok(code)
}

/// Next invoice code for `date`: `INV-YYYYMMDD-NNN`.
pub async fn next_invoice_code_in(conn: &mut SqliteConnection, date: NaiveDate) -> DbResult<String> {
    let last = last_issued(conn, date).await?;
    let next = next_invoice_code(date, last.as_deref());
    debug!(last = ?last, next = %next, "Invoice code derived");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{sale_type, test_db};

    async fn insert_code(conn: &mut SqliteConnection, type_id: &str, code: &str) {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, invoice_code, transaction_type_id, total_amount, payment_method,
                amount_paid, change_due, status, created_at
            ) VALUES (?1, ?2, ?3, '0.00', 'CASH', '0.00', '0.00', 'COMPLETED', ?4)
            "#,
        )
        .bind(kasir_core::new_id())
        .bind(code)
        .bind(type_id)
        .bind(chrono::Utc::now())
        .execute(conn)
        .await
        .unwrap();
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn test_first_code_of_day() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let code = next_invoice_code_in(&mut conn, day()).await.unwrap();
        assert_eq!(code, "INV-20261019-001");
    }

    #[tokio::test]
    async fn test_other_days_ignored() {
        let db = test_db().await;
        let t = sale_type(&db).await;
        let mut conn = db.pool().acquire().await.unwrap();

        insert_code(&mut conn, &t.id, "INV-20261018-007").await;
        insert_code(&mut conn, &t.id, "INV-20261019-002").await;
        insert_code(&mut conn, &t.id, "INV-20261020-009").await;

        let code = next_invoice_code_in(&mut conn, day()).await.unwrap();
        assert_eq!(code, "INV-20261019-003");
    }

    #[tokio::test]
    async fn test_numeric_order_past_999() {
        let db = test_db().await;
        let t = sale_type(&db).await;
        let mut conn = db.pool().acquire().await.unwrap();

        insert_code(&mut conn, &t.id, "INV-20261019-999").await;
        insert_code(&mut conn, &t.id, "INV-20261019-1000").await;

        let last = last_issued(&mut conn, day()).await.unwrap();
        assert_eq!(last.as_deref(), Some("INV-20261019-1000"));
        assert_eq!(
            next_invoice_code_in(&mut conn, day()).await.unwrap(),
            "INV-20261019-1001"
        );
    }
}
