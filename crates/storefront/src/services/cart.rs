//! Cart operations.

use thiserror::Error;
use tracing::instrument;

use shopzify_core::{ProductId, UserId};

use super::MAX_WRITE_ATTEMPTS;
use crate::db::{CartRepository, ProductRepository, Repositories, RepositoryError};
use crate::models::Cart;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Unknown or inactive product.
    #[error("Product not found")]
    ProductNotFound,

    #[error("Product not in cart")]
    NotInCart,

    #[error("Only {available} left in stock")]
    InsufficientStock { available: i32 },

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Cart was modified concurrently, please try again")]
    Conflict,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cart operations over the repositories.
pub struct CartService<'a> {
    products: &'a dyn ProductRepository,
    carts: &'a dyn CartRepository,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub fn new(repos: &'a Repositories) -> Self {
        Self {
            products: repos.products.as_ref(),
            carts: repos.carts.as_ref(),
        }
    }

    /// The user's cart; empty if they never added anything.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the cart cannot be read.
    pub async fn get(&self, user_id: UserId) -> Result<Cart, CartError> {
        Ok(Cart::from_optional(user_id, self.carts.get(user_id).await?))
    }

    /// Add `quantity` units of a product, snapshotting it on first add.
    ///
    /// # Errors
    ///
    /// - `InvalidQuantity` if `quantity` is below 1.
    /// - `ProductNotFound` if the product is unknown or inactive.
    /// - `InsufficientStock` if the cart would hold more than is in stock.
    #[instrument(skip_all, fields(user_id = %user_id, product_id = %product_id, quantity = quantity))]
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Cart, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let product = self
            .products
            .get(product_id)
            .await?
            .filter(|p| p.status)
            .ok_or(CartError::ProductNotFound)?;

        self.update(user_id, |cart| {
            let wanted = cart.quantity_of(product_id).saturating_add(quantity);
            if wanted > product.quantity {
                return Err(CartError::InsufficientStock {
                    available: product.quantity,
                });
            }
            cart.set_quantity(&product, wanted);
            Ok(())
        })
        .await
    }

    /// Take one unit of a product out of the cart.
    ///
    /// # Errors
    ///
    /// Returns `NotInCart` if the cart does not hold the product.
    #[instrument(skip_all, fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_one(&self, user_id: UserId, product_id: ProductId) -> Result<Cart, CartError> {
        self.update(user_id, |cart| {
            cart.decrement(product_id)
                .map(|_| ())
                .ok_or(CartError::NotInCart)
        })
        .await
    }

    /// Remove every item.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if every write attempt lost to a concurrent writer.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn clear(&self, user_id: UserId) -> Result<Cart, CartError> {
        self.update(user_id, |cart| {
            cart.clear();
            Ok(())
        })
        .await
    }

    /// Apply `change` to a freshly loaded cart and write it back, retrying
    /// the whole cycle on a revision conflict.
    ///
    /// An untouched cart that was never stored is not written.
    async fn update<F>(&self, user_id: UserId, mut change: F) -> Result<Cart, CartError>
    where
        F: FnMut(&mut Cart) -> Result<(), CartError> + Send,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut cart = self.get(user_id).await?;
            change(&mut cart)?;

            if cart.revision().is_none() && cart.is_empty() {
                return Ok(cart);
            }

            match self.carts.save(user_id, cart.items(), cart.revision()).await {
                Ok(revision) => {
                    tracing::debug!(revision, items = cart.items().len(), "Cart saved");
                    return Ok(cart);
                }
                Err(RepositoryError::Conflict(reason)) => {
                    tracing::debug!(attempt, %reason, "Cart write conflict");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(CartError::Conflict)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use shopzify_core::api::{NewProduct, ProductPatch};

    use super::*;
    use crate::config::PricingConfig;
    use crate::db::memory::MemoryStore;

    async fn setup(stock: i32) -> (Repositories, ProductId) {
        let store = Arc::new(MemoryStore::new());
        let repos = Repositories::memory(&store);
        let product = repos
            .products
            .create(&NewProduct {
                image: "jeans.png".to_owned(),
                name: "Jeans".to_owned(),
                discounted_price: Decimal::from(400),
                original_price: Decimal::from(500),
                description: "denim".to_owned(),
                quantity: stock,
                gender: "male".to_owned(),
                category: "jeans".to_owned(),
                status: true,
                badge: None,
            })
            .await
            .unwrap();
        (repos, product.id)
    }

    #[tokio::test]
    async fn test_add_increments_and_respects_stock() {
        let (repos, p) = setup(3).await;
        let carts = CartService::new(&repos);
        let user = UserId::new(1);

        carts.add(user, p, 1).await.unwrap();
        let cart = carts.add(user, p, 2).await.unwrap();
        assert_eq!(cart.quantity_of(p), 3);

        assert!(matches!(
            carts.add(user, p, 1).await,
            Err(CartError::InsufficientStock { available: 3 })
        ));
        assert_eq!(carts.get(user).await.unwrap().quantity_of(p), 3);
    }

    #[tokio::test]
    async fn test_add_rejects_inactive_and_bad_quantity() {
        let (repos, p) = setup(3).await;
        let carts = CartService::new(&repos);
        let user = UserId::new(1);

        assert!(matches!(
            carts.add(user, p, 0).await,
            Err(CartError::InvalidQuantity)
        ));

        let patch = ProductPatch {
            status: Some(false),
            ..ProductPatch::default()
        };
        repos.products.update(p, &patch).await.unwrap();
        assert!(matches!(
            carts.add(user, p, 1).await,
            Err(CartError::ProductNotFound)
        ));
    }

    #[tokio::test]
    async fn test_remove_then_clear() {
        let (repos, p) = setup(5).await;
        let carts = CartService::new(&repos);
        let user = UserId::new(1);

        assert!(matches!(
            carts.remove_one(user, p).await,
            Err(CartError::NotInCart)
        ));

        carts.add(user, p, 2).await.unwrap();
        let cart = carts.remove_one(user, p).await.unwrap();
        assert_eq!(cart.quantity_of(p), 1);

        let summary = cart.summary(&PricingConfig::default());
        assert_eq!(summary.subtotal, Decimal::from(400));
        assert_eq!(summary.discount, Decimal::from(100));

        assert!(carts.clear(user).await.unwrap().is_empty());
        assert!(carts.get(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clearing_missing_cart_writes_nothing() {
        let (repos, _) = setup(1).await;
        let carts = CartService::new(&repos);
        let user = UserId::new(7);

        carts.clear(user).await.unwrap();
        assert!(repos.carts.get(user).await.unwrap().is_none());
    }
}
