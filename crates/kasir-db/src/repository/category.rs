//! # Category Repository
//!
//! Product categories. A category can't be deleted while products use it.

use chrono::{DateTime, Utc};
use kasir_core::input::{non_blank, patch_text, CategoryPatch, NewCategory};
use kasir_core::{new_id, Category, CoreError};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::ServiceResult;
use crate::repository::{on_restrict, on_unique};

const ENTITY: &str = "Category";

#[derive(Debug, sqlx::FromRow)]
struct CategoryRecord {
    id: String,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRecord> for Category {
    fn from(r: CategoryRecord) -> Self {
        Category {
            id: r.id,
            name: r.name,
            description: r.description,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// All categories, ordered by name.
    pub async fn list(&self) -> ServiceResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, name, description, created_at, updated_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Category> {
        let row = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, name, description, created_at, updated_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Category::from)
            .ok_or_else(|| CoreError::not_found(ENTITY, id).into())
    }

    pub async fn create(&self, input: &NewCategory) -> ServiceResult<Category> {
        input.validate()?;

        let now = Utc::now();
        let category = Category {
            id: new_id(),
            name: input.name.trim().to_string(),
            description: non_blank(input.description.as_deref()),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| on_unique(e, || CoreError::duplicate_name(ENTITY, &category.name)))?;

        info!(id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update(&self, id: &str, patch: &CategoryPatch) -> ServiceResult<Category> {
        patch.validate()?;

        let mut category = self.get(id).await?;
        if let Some(name) = &patch.name {
            category.name = name.trim().to_string();
        }
        category.description = patch_text(category.description, &patch.description);
        category.updated_at = Utc::now();

        debug!(id = %id, "Updating category");

        sqlx::query(
            "UPDATE categories SET name = ?2, description = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| on_unique(e, || CoreError::duplicate_name(ENTITY, &category.name)))?;

        Ok(category)
    }

    /// Fails with `ReferentialConflict` while any product is in the category.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| on_restrict(e, "category", "products"))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(ENTITY, id).into());
        }

        info!(id = %id, "Category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::repository::test_support::{category, product, test_db};

    #[tokio::test]
    async fn test_create_and_list_by_name() {
        let db = test_db().await;
        category(&db, "Minuman").await;
        category(&db, "Makanan").await;

        let names: Vec<_> = db
            .categories()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Makanan", "Minuman"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = test_db().await;
        category(&db, "Minuman").await;

        let err = db
            .categories()
            .create(&NewCategory {
                name: "  Minuman ".into(),
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::DuplicateName { .. })
        ));
    }

    #[tokio::test]
    async fn test_partial_update_clears_description() {
        let db = test_db().await;
        let created = db
            .categories()
            .create(&NewCategory {
                name: "Minuman".into(),
                description: Some("Dingin dan panas".into()),
            })
            .await
            .unwrap();

        let patch: CategoryPatch = serde_json::from_str(r#"{"description":null}"#).unwrap();
        let updated = db.categories().update(&created.id, &patch).await.unwrap();

        assert_eq!(updated.name, "Minuman");
        assert_eq!(updated.description, None);
        assert_eq!(db.categories().get(&created.id).await.unwrap().description, None);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let db = test_db().await;
        let err = db.categories().get(&new_id()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_in_use_category_conflicts_and_keeps_rows() {
        let db = test_db().await;
        let drinks = category(&db, "Minuman").await;
        let coffee = product(&db, &drinks, "Kopi Susu", Some(25000)).await;

        let err = db.categories().delete(&drinks.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::ReferentialConflict { .. })
        ));

        assert!(db.categories().get(&drinks.id).await.is_ok());
        assert!(db.products().get(&coffee.product.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_unused_category() {
        let db = test_db().await;
        let snacks = category(&db, "Camilan").await;

        db.categories().delete(&snacks.id).await.unwrap();
        assert!(db.categories().delete(&snacks.id).await.is_err());
    }
}
