//! Wishlist documents in `PostgreSQL`.

use async_trait::async_trait;
use sqlx::PgPool;

use shopzify_core::UserId;
use shopzify_core::api::WishlistEntry;

use super::documents::{self, DocumentTable};
use super::{RepositoryError, Revisioned, WishlistRepository};

/// `PostgreSQL` wishlist repository.
pub struct PgWishlistRepository {
    pool: PgPool,
}

impl PgWishlistRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WishlistRepository for PgWishlistRepository {
    async fn get(
        &self,
        user_id: UserId,
    ) -> Result<Option<Revisioned<Vec<WishlistEntry>>>, RepositoryError> {
        documents::load(&self.pool, DocumentTable::Wishlist, user_id).await
    }

    async fn save(
        &self,
        user_id: UserId,
        entries: &[WishlistEntry],
        expected: Option<i64>,
    ) -> Result<i64, RepositoryError> {
        documents::save(&self.pool, DocumentTable::Wishlist, user_id, &entries, expected).await
    }
}
