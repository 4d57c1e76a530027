//! # Supplier Repository
//!
//! Suppliers and their contact details. Listing is paginated and searchable
//! by name or contact person.

use chrono::{DateTime, Utc};
use kasir_core::input::{non_blank, patch_text, NewSupplier, SupplierPatch};
use kasir_core::{new_id, CoreError, Page, Pagination, Supplier};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::ServiceResult;
use crate::repository::{like_pattern, on_restrict, on_unique};

const ENTITY: &str = "Supplier";

const SELECT_SUPPLIER: &str = r#"
    SELECT id, name, contact_person, phone, email, address, notes, created_at, updated_at
    FROM suppliers
"#;

// SQLite LIKE is case-insensitive for ASCII.
const SEARCH_CLAUSE: &str = r#"
    WHERE ?1 IS NULL
       OR name LIKE ?1 ESCAPE '\'
       OR contact_person LIKE ?1 ESCAPE '\'
"#;

#[derive(Debug, sqlx::FromRow)]
struct SupplierRecord {
    id: String,
    name: String,
    contact_person: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SupplierRecord> for Supplier {
    fn from(r: SupplierRecord) -> Self {
        Supplier {
            id: r.id,
            name: r.name,
            contact_person: r.contact_person,
            phone: r.phone,
            email: r.email,
            address: r.address,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// One page of suppliers ordered by name.
    pub async fn list(
        &self,
        search: Option<&str>,
        pagination: Pagination,
    ) -> ServiceResult<Page<Supplier>> {
        let pattern = search.map(like_pattern);
        debug!(search = ?search, page = pagination.page, "Listing suppliers");

        let rows = sqlx::query_as::<_, SupplierRecord>(&format!(
            "{SELECT_SUPPLIER} {SEARCH_CLAUSE} ORDER BY name LIMIT ?2 OFFSET ?3"
        ))
        .bind(&pattern)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM suppliers {SEARCH_CLAUSE}"))
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let suppliers = rows.into_iter().map(Supplier::from).collect();
        Ok(Page::new(suppliers, total, pagination))
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierRecord>(&format!("{SELECT_SUPPLIER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Supplier::from)
            .ok_or_else(|| CoreError::not_found(ENTITY, id).into())
    }

    pub async fn create(&self, input: &NewSupplier) -> ServiceResult<Supplier> {
        input.validate()?;

        let now = Utc::now();
        let supplier = Supplier {
            id: new_id(),
            name: input.name.trim().to_string(),
            contact_person: non_blank(input.contact_person.as_deref()),
            phone: non_blank(input.phone.as_deref()),
            email: non_blank(input.email.as_deref()),
            address: non_blank(input.address.as_deref()),
            notes: non_blank(input.notes.as_deref()),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, contact_person, phone, email, address, notes,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(&supplier.notes)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| on_unique(e, || CoreError::duplicate_name(ENTITY, &supplier.name)))?;

        info!(id = %supplier.id, name = %supplier.name, "Supplier created");
        Ok(supplier)
    }

    pub async fn update(&self, id: &str, patch: &SupplierPatch) -> ServiceResult<Supplier> {
        patch.validate()?;

        let mut s = self.get(id).await?;
        if let Some(name) = &patch.name {
            s.name = name.trim().to_string();
        }
        s.contact_person = patch_text(s.contact_person, &patch.contact_person);
        s.phone = patch_text(s.phone, &patch.phone);
        s.email = patch_text(s.email, &patch.email);
        s.address = patch_text(s.address, &patch.address);
        s.notes = patch_text(s.notes, &patch.notes);
        s.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?2,
                contact_person = ?3,
                phone = ?4,
                email = ?5,
                address = ?6,
                notes = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&s.id)
        .bind(&s.name)
        .bind(&s.contact_person)
        .bind(&s.phone)
        .bind(&s.email)
        .bind(&s.address)
        .bind(&s.notes)
        .bind(s.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| on_unique(e, || CoreError::duplicate_name(ENTITY, &s.name)))?;

        Ok(s)
    }

    /// Fails with `ReferentialConflict` while products are still sourced
    /// from this supplier.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| on_restrict(e, "supplier", "product-supplier links"))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(ENTITY, id).into());
        }

        info!(id = %id, "Supplier deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::repository::test_support::{supplier, test_db};

    #[tokio::test]
    async fn test_search_name_or_contact_case_insensitive() {
        let db = test_db().await;
        db.suppliers()
            .create(&NewSupplier {
                name: "PT Kopi Nusantara".into(),
                contact_person: Some("Budi".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        db.suppliers()
            .create(&NewSupplier {
                name: "CV Susu Segar".into(),
                contact_person: Some("Sari Kopiah".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        supplier(&db, "UD Gula Manis").await;

        let page = db
            .suppliers()
            .list(Some("KOPI"), Pagination::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].name, "CV Susu Segar");

        let all = db.suppliers().list(None, Pagination::default()).await.unwrap();
        assert_eq!(all.total, 3);
    }

    #[tokio::test]
    async fn test_pagination() {
        let db = test_db().await;
        for name in ["Alpha", "Bravo", "Charlie", "Delta", "Echo"] {
            supplier(&db, name).await;
        }

        let page = db
            .suppliers()
            .list(None, Pagination { limit: 2, page: 3 })
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.pages, 3);
        assert_eq!(page.page, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Echo");
    }

    #[tokio::test]
    async fn test_update_contact_fields() {
        let db = test_db().await;
        let created = supplier(&db, "PT Kopi Nusantara").await;

        let patch: SupplierPatch =
            serde_json::from_str(r#"{"phone":"+62 812-3456","email":"sales@kopi.id"}"#).unwrap();
        let updated = db.suppliers().update(&created.id, &patch).await.unwrap();

        assert_eq!(updated.phone.as_deref(), Some("+62 812-3456"));
        assert_eq!(updated.email.as_deref(), Some("sales@kopi.id"));
        assert_eq!(updated.name, "PT Kopi Nusantara");
    }

    #[tokio::test]
    async fn test_invalid_email_rejected_before_write() {
        let db = test_db().await;
        let err = db
            .suppliers()
            .create(&NewSupplier {
                name: "PT Kopi Nusantara".into(),
                email: Some("not-an-email".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
        assert_eq!(db.suppliers().list(None, Pagination::default()).await.unwrap().total, 0);
    }
}
