//! # Transaction Type Repository
//!
//! Kinds of transaction ("Penjualan", "Retur", ...) and how they affect
//! stock and revenue.

use chrono::{DateTime, Utc};
use kasir_core::input::{non_blank, patch_text, NewTransactionType, TransactionTypePatch};
use kasir_core::{new_id, CoreError, TransactionType};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::{DbResult, ServiceResult};
use crate::repository::{on_restrict, on_unique};

const ENTITY: &str = "Transaction type";

const SELECT_TYPE: &str = r#"
    SELECT id, name, description, is_positive_stock_effect, is_positive_revenue_effect,
           created_at, updated_at
    FROM transaction_types
"#;

#[derive(Debug, sqlx::FromRow)]
struct TransactionTypeRecord {
    id: String,
    name: String,
    description: Option<String>,
    is_positive_stock_effect: bool,
    is_positive_revenue_effect: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TransactionTypeRecord> for TransactionType {
    fn from(r: TransactionTypeRecord) -> Self {
        TransactionType {
            id: r.id,
            name: r.name,
            description: r.description,
            is_positive_stock_effect: r.is_positive_stock_effect,
            is_positive_revenue_effect: r.is_positive_revenue_effect,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Looks up a transaction type on an existing connection.
pub(crate) async fn find_in(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<TransactionType>> {
    let row = sqlx::query_as::<_, TransactionTypeRecord>(&format!("{SELECT_TYPE} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(TransactionType::from))
}

#[derive(Debug, Clone)]
pub struct TransactionTypeRepository {
    pool: SqlitePool,
}

impl TransactionTypeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionTypeRepository { pool }
    }

    pub async fn list(&self) -> ServiceResult<Vec<TransactionType>> {
        let rows = sqlx::query_as::<_, TransactionTypeRecord>(&format!("{SELECT_TYPE} ORDER BY name"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(TransactionType::from).collect())
    }

    pub async fn get(&self, id: &str) -> ServiceResult<TransactionType> {
        let mut conn = self.pool.acquire().await?;
        find_in(&mut conn, id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id).into())
    }

    pub async fn create(&self, input: &NewTransactionType) -> ServiceResult<TransactionType> {
        input.validate()?;

        let now = Utc::now();
        let t = TransactionType {
            id: new_id(),
            name: input.name.trim().to_string(),
            description: non_blank(input.description.as_deref()),
            is_positive_stock_effect: input.is_positive_stock_effect.unwrap_or(false),
            is_positive_revenue_effect: input.is_positive_revenue_effect.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO transaction_types (
                id, name, description, is_positive_stock_effect, is_positive_revenue_effect,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&t.id)
        .bind(&t.name)
        .bind(&t.description)
        .bind(t.is_positive_stock_effect)
        .bind(t.is_positive_revenue_effect)
        .bind(t.created_at)
        .bind(t.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| on_unique(e, || CoreError::duplicate_name(ENTITY, &t.name)))?;

        info!(id = %t.id, name = %t.name, "Transaction type created");
        Ok(t)
    }

    pub async fn update(
        &self,
        id: &str,
        patch: &TransactionTypePatch,
    ) -> ServiceResult<TransactionType> {
        patch.validate()?;

        let mut t = self.get(id).await?;
        if let Some(name) = &patch.name {
            t.name = name.trim().to_string();
        }
        t.description = patch_text(t.description, &patch.description);
        if let Some(flag) = patch.is_positive_stock_effect {
            t.is_positive_stock_effect = flag;
        }
        if let Some(flag) = patch.is_positive_revenue_effect {
            t.is_positive_revenue_effect = flag;
        }
        t.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE transaction_types SET
                name = ?2,
                description = ?3,
                is_positive_stock_effect = ?4,
                is_positive_revenue_effect = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&t.id)
        .bind(&t.name)
        .bind(&t.description)
        .bind(t.is_positive_stock_effect)
        .bind(t.is_positive_revenue_effect)
        .bind(t.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| on_unique(e, || CoreError::duplicate_name(ENTITY, &t.name)))?;

        Ok(t)
    }

    /// Fails with `ReferentialConflict` once any transaction uses the type.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM transaction_types WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| on_restrict(e, "transaction type", "transactions"))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(ENTITY, id).into());
        }

        info!(id = %id, "Transaction type deleted");
        Ok(())
    }
}
