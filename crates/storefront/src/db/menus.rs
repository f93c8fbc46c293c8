//! Navigation menus.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use shopzify_core::api::MenuItem;

use super::{MenuRepository, RepositoryError};

#[derive(Debug, FromRow)]
struct MenuRow {
    label: String,
    sublabels: Vec<String>,
}

/// `PostgreSQL` menu repository.
pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn list(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, MenuRow>(
            "SELECT label, sublabels FROM storefront.menu_item ORDER BY position, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MenuItem {
                label: row.label,
                sublabels: row.sublabels,
            })
            .collect())
    }

    async fn replace_all(&self, items: &[MenuItem]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM storefront.menu_item")
            .execute(&mut *tx)
            .await?;

        for (position, item) in (0_i32..).zip(items) {
            sqlx::query(
                "INSERT INTO storefront.menu_item (label, sublabels, position) VALUES ($1, $2, $3)",
            )
            .bind(&item.label)
            .bind(&item.sublabels)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
