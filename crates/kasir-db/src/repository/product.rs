//! # Product Repository
//!
//! Products, read together with their category and current price.
//!
//! ## Read Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products p                                                             │
//! │    JOIN categories c        ON c.id = p.category_id                     │
//! │    LEFT JOIN price_histories ph                                         │
//! │                             ON ph.product_id = p.id                     │
//! │                            AND ph.end_date IS NULL   (the open entry)   │
//! │                                                                         │
//! │  → ProductDetail { ..product, category: {id, name}, currentPrice }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Writes
//! Create and update run in one unit of work: the product row, then
//! [`set_price_in`](crate::price_ledger::set_price_in) when a price is given.
//! A rejected price leaves the product row untouched.

use chrono::{DateTime, Utc};
use kasir_core::input::{non_blank, patch_text, NewProduct, ProductPatch};
use kasir_core::{new_id, CoreError, EntityRef, Page, Pagination, Product, ProductDetail};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument};

use crate::error::{DbError, DbResult, ServiceResult};
use crate::price_ledger::set_price_in;
use crate::repository::{
    like_pattern, on_restrict, on_unique, parse_optional_money, row_exists,
};
use crate::unit_of_work::UnitOfWork;

const ENTITY: &str = "Product";

const SELECT_DETAIL: &str = r#"
    SELECT
        p.id,
        p.name,
        p.description,
        p.stock,
        p.image_url,
        p.category_id,
        p.discount,
        p.created_at,
        p.updated_at,
        c.name  AS category_name,
        ph.price AS current_price
    FROM products p
    JOIN categories c ON c.id = p.category_id
    LEFT JOIN price_histories ph ON ph.product_id = p.id AND ph.end_date IS NULL
"#;

const FILTER_CLAUSE: &str = r#"
    WHERE (?1 IS NULL OR p.name LIKE ?1 ESCAPE '\' OR p.description LIKE ?1 ESCAPE '\')
      AND (?2 IS NULL OR p.category_id = ?2)
"#;

#[derive(Debug, sqlx::FromRow)]
struct ProductRecord {
    id: String,
    name: String,
    description: Option<String>,
    stock: i64,
    image_url: Option<String>,
    category_id: String,
    discount: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: String,
    current_price: Option<String>,
}

impl TryFrom<ProductRecord> for ProductDetail {
    type Error = DbError;

    fn try_from(r: ProductRecord) -> DbResult<Self> {
        Ok(ProductDetail {
            current_price: parse_optional_money("price_histories.price", r.current_price.as_deref())?,
            category: EntityRef {
                id: r.category_id.clone(),
                name: r.category_name,
            },
            product: Product {
                discount: parse_optional_money("products.discount", r.discount.as_deref())?,
                id: r.id,
                name: r.name,
                description: r.description,
                stock: r.stock,
                image_url: r.image_url,
                category_id: r.category_id,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        })
    }
}

/// Filters for [`ProductRepository::list`].
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub pagination: Pagination,
}

pub(crate) async fn find_in(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<ProductDetail>> {
    let row = sqlx::query_as::<_, ProductRecord>(&format!("{SELECT_DETAIL} WHERE p.id = ?1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    row.map(ProductDetail::try_from).transpose()
}

async fn ensure_category(conn: &mut SqliteConnection, category_id: &str) -> ServiceResult<()> {
    if row_exists(conn, "categories", category_id).await? {
        Ok(())
    } else {
        Err(CoreError::InvalidReference {
            entity: "Category",
            id: category_id.to_string(),
        }
        .into())
    }
}

async fn load_written(conn: &mut SqliteConnection, id: &str) -> ServiceResult<ProductDetail> {
    find_in(conn, id)
        .await?
        .ok_or_else(|| DbError::Internal(format!("product {id} vanished mid-transaction")).into())
}

#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// One page of products ordered by name.
    pub async fn list(&self, query: &ProductQuery) -> ServiceResult<Page<ProductDetail>> {
        let pattern = query.search.as_deref().map(like_pattern);
        let pagination = query.pagination;

        debug!(
            search = ?query.search,
            category_id = ?query.category_id,
            page = pagination.page,
            "Listing products"
        );

        let rows = sqlx::query_as::<_, ProductRecord>(&format!(
            "{SELECT_DETAIL} {FILTER_CLAUSE} ORDER BY p.name LIMIT ?3 OFFSET ?4"
        ))
        .bind(&pattern)
        .bind(&query.category_id)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products p {FILTER_CLAUSE}"))
                .bind(&pattern)
                .bind(&query.category_id)
                .fetch_one(&self.pool)
                .await?;

        let products = rows
            .into_iter()
            .map(ProductDetail::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page::new(products, total, pagination))
    }

    pub async fn get(&self, id: &str) -> ServiceResult<ProductDetail> {
        let mut conn = self.pool.acquire().await?;
        find_in(&mut conn, id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id).into())
    }

    /// Creates a product and, when a price is given, opens its price ledger.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &NewProduct) -> ServiceResult<ProductDetail> {
        input.validate()?;

        let now = Utc::now();
        let id = new_id();
        let name = input.name.trim().to_string();
        let category_id = input.category_id.trim();

        let mut uow = UnitOfWork::begin_immediate(&self.pool).await?;
        ensure_category(uow.conn(), category_id).await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, stock, image_url, category_id, discount,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
        )
        .bind(&id)
        .bind(&name)
        .bind(non_blank(input.description.as_deref()))
        .bind(input.stock.unwrap_or_default())
        .bind(non_blank(input.image_url.as_deref()))
        .bind(category_id)
        .bind(input.discount.map(|d| d.to_storage_string()))
        .bind(now)
        .execute(uow.conn())
        .await
        .map_err(|e| on_unique(e, || CoreError::duplicate_name(ENTITY, &name)))?;

        if let Some(price) = input.price {
            set_price_in(uow.conn(), &id, price, now).await?;
        }

        let detail = load_written(uow.conn(), &id).await?;
        uow.commit().await?;

        info!(id = %id, "Product created");
        Ok(detail)
    }

    /// Partial update. A `price` goes through the ledger; an equal price
    /// writes nothing there.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> ServiceResult<ProductDetail> {
        patch.validate()?;

        let now = Utc::now();
        let mut uow = UnitOfWork::begin_immediate(&self.pool).await?;

        let mut product = find_in(uow.conn(), id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))?
            .product;

        if patch.touches_row() {
            if let Some(name) = &patch.name {
                product.name = name.trim().to_string();
            }
            product.description = patch_text(product.description, &patch.description);
            if let Some(stock) = patch.stock {
                product.stock = stock;
            }
            product.image_url = patch_text(product.image_url, &patch.image_url);
            if let Some(category_id) = &patch.category_id {
                let category_id = category_id.trim();
                if category_id != product.category_id {
                    ensure_category(uow.conn(), category_id).await?;
                    product.category_id = category_id.to_string();
                }
            }
            if let Some(discount) = patch.discount {
                product.discount = discount;
            }

            sqlx::query(
                r#"
                UPDATE products SET
                    name = ?2,
                    description = ?3,
                    stock = ?4,
                    image_url = ?5,
                    category_id = ?6,
                    discount = ?7,
                    updated_at = ?8
                WHERE id = ?1
                "#,
            )
            .bind(&product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.stock)
            .bind(&product.image_url)
            .bind(&product.category_id)
            .bind(product.discount.map(|d| d.to_storage_string()))
            .bind(now)
            .execute(uow.conn())
            .await
            .map_err(|e| on_unique(e, || CoreError::duplicate_name(ENTITY, &product.name)))?;
        }

        if let Some(price) = patch.price {
            set_price_in(uow.conn(), id, price, now).await?;
        }

        let detail = load_written(uow.conn(), id).await?;
        uow.commit().await?;

        debug!(id = %id, "Product updated");
        Ok(detail)
    }

    /// Removes the product with its price history and supplier links.
    /// Fails with `ReferentialConflict` once it appears on a transaction.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| on_restrict(e, "product", "transactions"))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(ENTITY, id).into());
        }

        info!(id = %id, "Product deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
