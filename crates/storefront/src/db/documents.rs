//! Per-user JSONB documents with revision-checked writes.
//!
//! Wishlists and carts share this storage shape:
//! `(user_id PRIMARY KEY, products JSONB, revision BIGINT, updated_at)`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use sqlx::types::Json;

use shopzify_core::UserId;

use super::{RepositoryError, Revisioned};

/// Tables holding per-user documents.
#[derive(Debug, Clone, Copy)]
pub(super) enum DocumentTable {
    Wishlist,
    Cart,
}

impl DocumentTable {
    const fn name(self) -> &'static str {
        match self {
            Self::Wishlist => "storefront.wishlist",
            Self::Cart => "storefront.cart",
        }
    }
}

pub(super) async fn load<T: DeserializeOwned>(
    pool: &PgPool,
    table: DocumentTable,
    user_id: UserId,
) -> Result<Option<Revisioned<T>>, RepositoryError> {
    let row: Option<(serde_json::Value, i64)> = sqlx::query_as(&format!(
        "SELECT products, revision FROM {} WHERE user_id = $1",
        table.name()
    ))
    .bind(user_id.as_i32())
    .fetch_optional(pool)
    .await?;

    row.map(|(products, revision)| {
        serde_json::from_value(products)
            .map(|value| Revisioned { value, revision })
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid {} document: {e}", table.name()))
            })
    })
    .transpose()
}

pub(super) async fn save<T: Serialize + Sync>(
    pool: &PgPool,
    table: DocumentTable,
    user_id: UserId,
    value: &T,
    expected: Option<i64>,
) -> Result<i64, RepositoryError> {
    let revision: Option<i64> = match expected {
        None => {
            sqlx::query_scalar(&format!(
                "INSERT INTO {} (user_id, products, revision) VALUES ($1, $2, 1) \
                 ON CONFLICT (user_id) DO NOTHING \
                 RETURNING revision",
                table.name()
            ))
            .bind(user_id.as_i32())
            .bind(Json(value))
            .fetch_optional(pool)
            .await?
        }
        Some(expected) => {
            sqlx::query_scalar(&format!(
                "UPDATE {} SET products = $2, revision = revision + 1, updated_at = now() \
                 WHERE user_id = $1 AND revision = $3 \
                 RETURNING revision",
                table.name()
            ))
            .bind(user_id.as_i32())
            .bind(Json(value))
            .bind(expected)
            .fetch_optional(pool)
            .await?
        }
    };

    revision.ok_or_else(|| {
        RepositoryError::Conflict(format!("{} changed since it was read", table.name()))
    })
}
