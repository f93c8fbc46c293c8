//! Cart documents in `PostgreSQL`.

use async_trait::async_trait;
use sqlx::PgPool;

use shopzify_core::UserId;
use shopzify_core::api::CartItem;

use super::documents::{self, DocumentTable};
use super::{CartRepository, RepositoryError, Revisioned};

/// `PostgreSQL` cart repository.
pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn get(
        &self,
        user_id: UserId,
    ) -> Result<Option<Revisioned<Vec<CartItem>>>, RepositoryError> {
        documents::load(&self.pool, DocumentTable::Cart, user_id).await
    }

    async fn save(
        &self,
        user_id: UserId,
        items: &[CartItem],
        expected: Option<i64>,
    ) -> Result<i64, RepositoryError> {
        documents::save(&self.pool, DocumentTable::Cart, user_id, &items, expected).await
    }
}
