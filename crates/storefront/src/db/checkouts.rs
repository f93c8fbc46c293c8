//! Placed orders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use shopzify_core::api::{CartItem, CartSummary, Checkout, ShippingAddress};
use shopzify_core::{CheckoutId, UserId};

use super::{CheckoutRepository, NewCheckout, RepositoryError};

#[derive(Debug, FromRow)]
struct CheckoutRow {
    id: i32,
    user_id: i32,
    products: Json<Vec<CartItem>>,
    address: Json<ShippingAddress>,
    summary: Json<CartSummary>,
    created_at: DateTime<Utc>,
}

impl From<CheckoutRow> for Checkout {
    fn from(row: CheckoutRow) -> Self {
        Self {
            id: CheckoutId::new(row.id),
            user_id: UserId::new(row.user_id),
            products: row.products.0,
            address: row.address.0,
            summary: row.summary.0,
            created_at: row.created_at,
        }
    }
}

/// `PostgreSQL` checkout repository.
pub struct PgCheckoutRepository {
    pool: PgPool,
}

impl PgCheckoutRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckoutRepository for PgCheckoutRepository {
    async fn create(&self, checkout: NewCheckout<'_>) -> Result<Checkout, RepositoryError> {
        let row = sqlx::query_as::<_, CheckoutRow>(
            r"
            INSERT INTO storefront.checkout (user_id, products, address, summary, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, products, address, summary, created_at
            ",
        )
        .bind(checkout.user_id.as_i32())
        .bind(Json(checkout.products))
        .bind(Json(checkout.address))
        .bind(Json(checkout.summary))
        .bind(checkout.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<Checkout>, RepositoryError> {
        let rows = sqlx::query_as::<_, CheckoutRow>(
            r"
            SELECT id, user_id, products, address, summary, created_at
            FROM storefront.checkout
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Checkout::from).collect())
    }
}
