//! Persistence for the storefront.
//!
//! # Database: `shopzify`
//!
//! ## Tables (schema `storefront`)
//!
//! - `user` - Accounts with argon2 password hashes
//! - `product` - Catalog
//! - `wishlist` - One JSONB document per user, guarded by `revision`
//! - `cart` - One JSONB document per user, guarded by `revision`
//! - `checkout` - Placed orders (JSONB snapshots)
//! - `menu_item` - Navigation menus
//!
//! Sessions live in `tower_sessions.session`, created by the session store's
//! own migration.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p shopzify-cli -- migrate storefront
//! ```
//!
//! Every repository is a trait so handlers and services can run against
//! either the `Pg*Repository` types or the in-memory [`memory::MemoryStore`].

pub mod carts;
pub mod checkouts;
mod documents;
pub mod memory;
pub mod menus;
pub mod products;
pub mod users;
pub mod wishlists;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shopzify_core::api::{
    CartItem, CartSummary, Checkout, MenuItem, NewProduct, Product, ProductPatch,
    ShippingAddress, WishlistEntry,
};
use shopzify_core::{Email, ProductId, UserId};

use crate::models::user::User;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (unique email, stale revision).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// A per-user document together with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revisioned<T> {
    pub value: T,
    pub revision: i64,
}

/// Which products a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Skip inactive products.
    pub active_only: bool,
    /// Maximum number of products, oldest first.
    pub limit: Option<i64>,
}

impl ProductQuery {
    #[must_use]
    pub const fn active() -> Self {
        Self {
            active_only: true,
            limit: None,
        }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self {
            active_only: false,
            limit: None,
        }
    }

    #[must_use]
    pub const fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }
}

/// Catalog storage.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self, query: ProductQuery) -> Result<Vec<Product>, RepositoryError>;
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError>;
    /// Returns `None` when no product has this id.
    async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, RepositoryError>;
    /// Returns `false` when no product has this id.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

/// Account storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    /// The user and their password hash, for login.
    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;
    /// Fails with [`RepositoryError::Conflict`] if the email is taken.
    async fn create_with_password(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError>;
}

/// Wishlist documents.
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    async fn get(
        &self,
        user_id: UserId,
    ) -> Result<Option<Revisioned<Vec<WishlistEntry>>>, RepositoryError>;
    /// Conditional write. `expected` is the revision the caller read, or
    /// `None` if it found no document. Returns the new revision, or
    /// [`RepositoryError::Conflict`] if the stored document moved on.
    async fn save(
        &self,
        user_id: UserId,
        entries: &[WishlistEntry],
        expected: Option<i64>,
    ) -> Result<i64, RepositoryError>;
}

/// Cart documents. Same conditional-write contract as [`WishlistRepository`].
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn get(&self, user_id: UserId)
    -> Result<Option<Revisioned<Vec<CartItem>>>, RepositoryError>;
    async fn save(
        &self,
        user_id: UserId,
        items: &[CartItem],
        expected: Option<i64>,
    ) -> Result<i64, RepositoryError>;
}

/// A checkout about to be recorded.
#[derive(Debug, Clone)]
pub struct NewCheckout<'a> {
    pub user_id: UserId,
    pub products: &'a [CartItem],
    pub address: &'a ShippingAddress,
    pub summary: &'a CartSummary,
    pub created_at: DateTime<Utc>,
}

/// Placed orders.
#[async_trait]
pub trait CheckoutRepository: Send + Sync {
    async fn create(&self, checkout: NewCheckout<'_>) -> Result<Checkout, RepositoryError>;
    /// Newest first.
    async fn list(&self, user_id: UserId) -> Result<Vec<Checkout>, RepositoryError>;
}

/// Navigation menus.
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// In display order.
    async fn list(&self) -> Result<Vec<MenuItem>, RepositoryError>;
    /// Replace every menu with `items`, keeping their order.
    async fn replace_all(&self, items: &[MenuItem]) -> Result<(), RepositoryError>;
}

/// The full set of repositories a running storefront needs.
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    pub wishlists: Arc<dyn WishlistRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub checkouts: Arc<dyn CheckoutRepository>,
    pub menus: Arc<dyn MenuRepository>,
}

impl Repositories {
    /// Repositories backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            products: Arc::new(products::PgProductRepository::new(pool.clone())),
            users: Arc::new(users::PgUserRepository::new(pool.clone())),
            wishlists: Arc::new(wishlists::PgWishlistRepository::new(pool.clone())),
            carts: Arc::new(carts::PgCartRepository::new(pool.clone())),
            checkouts: Arc::new(checkouts::PgCheckoutRepository::new(pool.clone())),
            menus: Arc::new(menus::PgMenuRepository::new(pool.clone())),
        }
    }

    /// Repositories sharing one in-memory store.
    #[must_use]
    pub fn memory(store: &Arc<memory::MemoryStore>) -> Self {
        Self {
            products: store.clone(),
            users: store.clone(),
            wishlists: store.clone(),
            carts: store.clone(),
            checkouts: store.clone(),
            menus: store.clone(),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`].
pub(crate) fn map_unique_violation(err: sqlx::Error, what: &str) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(format!("{what} already exists"))
        }
        _ => RepositoryError::Database(err),
    }
}
