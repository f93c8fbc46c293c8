//! Catalog queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use shopzify_core::ProductId;
use shopzify_core::api::{NewProduct, Product, ProductPatch};

use super::{ProductQuery, ProductRepository, RepositoryError};

const PRODUCT_COLUMNS: &str = "id, image, name, discounted_price, original_price, description, \
     quantity, gender, category, status, badge, record_date";

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i32,
    image: String,
    name: String,
    discounted_price: Decimal,
    original_price: Decimal,
    description: String,
    quantity: i32,
    gender: String,
    category: String,
    status: bool,
    badge: Option<String>,
    record_date: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            image: row.image,
            name: row.name,
            discounted_price: row.discounted_price,
            original_price: row.original_price,
            description: row.description,
            quantity: row.quantity,
            gender: row.gender,
            category: row.category,
            status: row.status,
            badge: row.badge,
            record_date: row.record_date,
        }
    }
}

/// `PostgreSQL` catalog repository.
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self, query: ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        // LIMIT NULL means no limit
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product \
             WHERE ($1 = FALSE OR status) ORDER BY id LIMIT $2"
        ))
        .bind(query.active_only)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO storefront.product \
                 (image, name, discounted_price, original_price, description, \
                  quantity, gender, category, status, badge) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.image)
        .bind(&product.name)
        .bind(product.discounted_price)
        .bind(product.original_price)
        .bind(&product.description)
        .bind(product.quantity)
        .bind(&product.gender)
        .bind(&product.category)
        .bind(product.status)
        .bind(&product.badge)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE storefront.product SET \
                 image = COALESCE($2, image), \
                 name = COALESCE($3, name), \
                 discounted_price = COALESCE($4, discounted_price), \
                 original_price = COALESCE($5, original_price), \
                 description = COALESCE($6, description), \
                 quantity = COALESCE($7, quantity), \
                 gender = COALESCE($8, gender), \
                 category = COALESCE($9, category), \
                 status = COALESCE($10, status), \
                 badge = COALESCE($11, badge) \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&patch.image)
        .bind(&patch.name)
        .bind(patch.discounted_price)
        .bind(patch.original_price)
        .bind(&patch.description)
        .bind(patch.quantity)
        .bind(&patch.gender)
        .bind(&patch.category)
        .bind(patch.status)
        .bind(&patch.badge)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.product WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
