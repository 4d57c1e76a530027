//! # Product-Supplier Repository
//!
//! Sourcing links between products and suppliers: who supplies what, at
//! which unit cost. Independent of the selling price in the price ledger.
//!
//! Links are addressed by `(product_id, supplier_id)`, which is unique.

use chrono::{DateTime, Utc};
use kasir_core::input::{non_blank, patch_text, NewProductSupplier, ProductSupplierPatch};
use kasir_core::{
    new_id, CoreError, EntityRef, ProductSupplier, ProductSupplierDetail, SupplierRef,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::{DbError, DbResult, ServiceResult};
use crate::repository::{on_unique, parse_money, row_exists};

const ENTITY: &str = "Product-supplier link";

const SELECT_DETAIL: &str = r#"
    SELECT
        ps.id,
        ps.product_id,
        ps.supplier_id,
        ps.supplier_sku,
        ps.unit_cost,
        ps.min_order_quantity,
        ps.lead_time_days,
        ps.last_purchased_at,
        ps.created_at,
        ps.updated_at,
        p.name           AS product_name,
        s.name           AS supplier_name,
        s.contact_person AS supplier_contact_person
    FROM product_suppliers ps
    JOIN products p  ON p.id = ps.product_id
    JOIN suppliers s ON s.id = ps.supplier_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct ProductSupplierRecord {
    id: String,
    product_id: String,
    supplier_id: String,
    supplier_sku: Option<String>,
    unit_cost: String,
    min_order_quantity: Option<i64>,
    lead_time_days: Option<i64>,
    last_purchased_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    product_name: String,
    supplier_name: String,
    supplier_contact_person: Option<String>,
}

impl TryFrom<ProductSupplierRecord> for ProductSupplierDetail {
    type Error = DbError;

    fn try_from(r: ProductSupplierRecord) -> DbResult<Self> {
        Ok(ProductSupplierDetail {
            product: EntityRef {
                id: r.product_id.clone(),
                name: r.product_name,
            },
            supplier: SupplierRef {
                id: r.supplier_id.clone(),
                name: r.supplier_name,
                contact_person: r.supplier_contact_person,
            },
            link: ProductSupplier {
                unit_cost: parse_money("product_suppliers.unit_cost", &r.unit_cost)?,
                id: r.id,
                product_id: r.product_id,
                supplier_id: r.supplier_id,
                supplier_sku: r.supplier_sku,
                min_order_quantity: r.min_order_quantity,
                lead_time_days: r.lead_time_days,
                last_purchased_at: r.last_purchased_at,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        })
    }
}

async fn find_in(
    conn: &mut SqliteConnection,
    product_id: &str,
    supplier_id: &str,
) -> DbResult<Option<ProductSupplierDetail>> {
    let row = sqlx::query_as::<_, ProductSupplierRecord>(&format!(
        "{SELECT_DETAIL} WHERE ps.product_id = ?1 AND ps.supplier_id = ?2"
    ))
    .bind(product_id)
    .bind(supplier_id)
    .fetch_optional(conn)
    .await?;

    row.map(ProductSupplierDetail::try_from).transpose()
}

async fn ensure_product(conn: &mut SqliteConnection, product_id: &str) -> ServiceResult<()> {
    if row_exists(conn, "products", product_id).await? {
        Ok(())
    } else {
        Err(CoreError::not_found("Product", product_id).into())
    }
}

#[derive(Debug, Clone)]
pub struct ProductSupplierRepository {
    pool: SqlitePool,
}

impl ProductSupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductSupplierRepository { pool }
    }

    /// All suppliers of a product, ordered by supplier name.
    pub async fn list(&self, product_id: &str) -> ServiceResult<Vec<ProductSupplierDetail>> {
        let mut conn = self.pool.acquire().await?;
        ensure_product(&mut conn, product_id).await?;

        let rows = sqlx::query_as::<_, ProductSupplierRecord>(&format!(
            "{SELECT_DETAIL} WHERE ps.product_id = ?1 ORDER BY s.name"
        ))
        .bind(product_id)
        .fetch_all(&mut *conn)
        .await?;

        let links = rows
            .into_iter()
            .map(ProductSupplierDetail::try_from)
            .collect::<DbResult<Vec<_>>>()?;
        Ok(links)
    }

    pub async fn get(&self, product_id: &str, supplier_id: &str) -> ServiceResult<ProductSupplierDetail> {
        let mut conn = self.pool.acquire().await?;
        find_in(&mut conn, product_id, supplier_id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, format!("{product_id}/{supplier_id}")).into())
    }

    pub async fn create(
        &self,
        product_id: &str,
        input: &NewProductSupplier,
    ) -> ServiceResult<ProductSupplierDetail> {
        input.validate()?;
        let supplier_id = input.supplier_id.trim();

        let mut conn = self.pool.acquire().await?;
        ensure_product(&mut conn, product_id).await?;
        if !row_exists(&mut conn, "suppliers", supplier_id).await? {
            return Err(CoreError::InvalidReference {
                entity: "Supplier",
                id: supplier_id.to_string(),
            }
            .into());
        }

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO product_suppliers (
                id, product_id, supplier_id, supplier_sku, unit_cost,
                min_order_quantity, lead_time_days, last_purchased_at,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
        )
        .bind(new_id())
        .bind(product_id)
        .bind(supplier_id)
        .bind(non_blank(input.supplier_sku.as_deref()))
        .bind(input.unit_cost.map(|c| c.to_storage_string()))
        .bind(input.min_order_quantity)
        .bind(input.lead_time_days)
        .bind(input.last_purchased_at)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            on_unique(e, || CoreError::DuplicateLink {
                product_id: product_id.to_string(),
                supplier_id: supplier_id.to_string(),
            })
        })?;

        info!(product_id = %product_id, supplier_id = %supplier_id, "Product linked to supplier");

        find_in(&mut conn, product_id, supplier_id)
            .await?
            .ok_or_else(|| DbError::Internal("link vanished after insert".into()).into())
    }

    pub async fn update(
        &self,
        product_id: &str,
        supplier_id: &str,
        patch: &ProductSupplierPatch,
    ) -> ServiceResult<ProductSupplierDetail> {
        patch.validate()?;

        let mut conn = self.pool.acquire().await?;
        let mut link = find_in(&mut conn, product_id, supplier_id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, format!("{product_id}/{supplier_id}")))?
            .link;

        link.supplier_sku = patch_text(link.supplier_sku, &patch.supplier_sku);
        if let Some(cost) = patch.unit_cost {
            link.unit_cost = cost;
        }
        if let Some(moq) = patch.min_order_quantity {
            link.min_order_quantity = moq;
        }
        if let Some(days) = patch.lead_time_days {
            link.lead_time_days = days;
        }
        if let Some(at) = patch.last_purchased_at {
            link.last_purchased_at = at;
        }

        sqlx::query(
            r#"
            UPDATE product_suppliers SET
                supplier_sku = ?2,
                unit_cost = ?3,
                min_order_quantity = ?4,
                lead_time_days = ?5,
                last_purchased_at = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&link.id)
        .bind(&link.supplier_sku)
        .bind(link.unit_cost.to_storage_string())
        .bind(link.min_order_quantity)
        .bind(link.lead_time_days)
        .bind(link.last_purchased_at)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        find_in(&mut conn, product_id, supplier_id)
            .await?
            .ok_or_else(|| DbError::Internal("link vanished after update".into()).into())
    }

    pub async fn delete(&self, product_id: &str, supplier_id: &str) -> ServiceResult<()> {
        let result =
            sqlx::query("DELETE FROM product_suppliers WHERE product_id = ?1 AND supplier_id = ?2")
                .bind(product_id)
                .bind(supplier_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(ENTITY, format!("{product_id}/{supplier_id}")).into());
        }

        info!(product_id = %product_id, supplier_id = %supplier_id, "Product-supplier link removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::repository::test_support::{category, product, supplier, test_db};
    use kasir_core::Money;

    fn link_to(supplier_id: &str, cost: i64) -> NewProductSupplier {
        NewProductSupplier {
            supplier_id: supplier_id.to_string(),
            unit_cost: Some(Money::from_units(cost)),
            min_order_quantity: Some(12),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_link_and_read_back() {
        let db = test_db().await;
        let cat = category(&db, "Minuman").await;
        let p = product(&db, &cat, "Kopi Susu", Some(25000)).await;
        let s = db
            .suppliers()
            .create(&kasir_core::input::NewSupplier {
                name: "PT Kopi Nusantara".into(),
                contact_person: Some("Budi".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let link = db
            .product_suppliers()
            .create(&p.product.id, &link_to(&s.id, 15000))
            .await
            .unwrap();

        assert_eq!(link.product.name, "Kopi Susu");
        assert_eq!(link.supplier.contact_person.as_deref(), Some("Budi"));
        assert_eq!(link.link.unit_cost, Money::from_units(15000));
        assert_eq!(link.link.min_order_quantity, Some(12));

        let listed = db.product_suppliers().list(&p.product.id).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_link_rejected() {
        let db = test_db().await;
        let cat = category(&db, "Minuman").await;
        let p = product(&db, &cat, "Kopi Susu", None).await;
        let s = supplier(&db, "PT Kopi Nusantara").await;
        let repo = db.product_suppliers();

        repo.create(&p.product.id, &link_to(&s.id, 15000)).await.unwrap();
        let err = repo
            .create(&p.product.id, &link_to(&s.id, 16000))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::DuplicateLink { .. })));
    }

    #[tokio::test]
    async fn test_unknown_supplier_and_product() {
        let db = test_db().await;
        let cat = category(&db, "Minuman").await;
        let p = product(&db, &cat, "Kopi Susu", None).await;
        let repo = db.product_suppliers();

        let err = repo
            .create(&p.product.id, &link_to(&new_id(), 1000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InvalidReference { entity: "Supplier", .. })
        ));

        let err = repo.list(&new_id()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::NotFound { entity: "Product", .. })));
    }

    #[tokio::test]
    async fn test_update_and_clear_terms() {
        let db = test_db().await;
        let cat = category(&db, "Minuman").await;
        let p = product(&db, &cat, "Kopi Susu", None).await;
        let s = supplier(&db, "PT Kopi Nusantara").await;
        let repo = db.product_suppliers();
        repo.create(&p.product.id, &link_to(&s.id, 15000)).await.unwrap();

        let patch: ProductSupplierPatch =
            serde_json::from_str(r#"{"unitCost":"14500.50","minOrderQuantity":null}"#).unwrap();
        let updated = repo.update(&p.product.id, &s.id, &patch).await.unwrap();

        assert_eq!(updated.link.unit_cost.to_string(), "14500.50");
        assert_eq!(updated.link.min_order_quantity, None);
    }

    #[tokio::test]
    async fn test_supplier_delete_blocked_while_linked() {
        let db = test_db().await;
        let cat = category(&db, "Minuman").await;
        let p = product(&db, &cat, "Kopi Susu", None).await;
        let s = supplier(&db, "PT Kopi Nusantara").await;
        db.product_suppliers()
            .create(&p.product.id, &link_to(&s.id, 15000))
            .await
            .unwrap();

        let err = db.suppliers().delete(&s.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::ReferentialConflict { .. })
        ));

        db.product_suppliers().delete(&p.product.id, &s.id).await.unwrap();
        db.suppliers().delete(&s.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_product_delete_cascades_links() {
        let db = test_db().await;
        let cat = category(&db, "Minuman").await;
        let p = product(&db, &cat, "Kopi Susu", None).await;
        let s = supplier(&db, "PT Kopi Nusantara").await;
        db.product_suppliers()
            .create(&p.product.id, &link_to(&s.id, 15000))
            .await
            .unwrap();

        db.products().delete(&p.product.id).await.unwrap();

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_suppliers")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(links, 0);
    }
}
