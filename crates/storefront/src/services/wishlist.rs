//! Wishlist toggle.
//!
//! A toggle flips the presence of one product in the user's wishlist. The
//! read-decide-write cycle is retried when the conditional write loses to a
//! concurrent writer.

use thiserror::Error;
use tracing::instrument;

use shopzify_core::api::WishlistEntry;
use shopzify_core::{ProductId, UserId};

use super::MAX_WRITE_ATTEMPTS;
use crate::db::{
    ProductRepository, Repositories, RepositoryError, UserRepository, WishlistRepository,
};
use crate::models::Wishlist;

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl ToggleOutcome {
    /// User-facing confirmation.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Added => "Product added to wishlist",
            Self::Removed => "Product removed from wishlist",
        }
    }
}

/// Errors from wishlist operations.
#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("User not found")]
    UserNotFound,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Wishlist not found")]
    WishlistNotFound,

    /// Request named no product id in the expected field.
    #[error("Product id is required")]
    MissingProductId,

    /// Every attempt lost to a concurrent write.
    #[error("Wishlist was modified concurrently, please try again")]
    Conflict,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Wishlist operations over the repositories.
pub struct WishlistService<'a> {
    users: &'a dyn UserRepository,
    products: &'a dyn ProductRepository,
    wishlists: &'a dyn WishlistRepository,
}

impl<'a> WishlistService<'a> {
    #[must_use]
    pub fn new(repos: &'a Repositories) -> Self {
        Self {
            users: repos.users.as_ref(),
            products: repos.products.as_ref(),
            wishlists: repos.wishlists.as_ref(),
        }
    }

    /// Add `product_id` if absent, remove it if present.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user does not exist.
    /// - `ProductNotFound` if adding a product that does not exist; nothing is written.
    /// - `Conflict` if every write attempt lost to a concurrent writer.
    #[instrument(skip_all, fields(user_id = %user_id, product_id = %product_id))]
    pub async fn toggle(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<ToggleOutcome, WishlistError> {
        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(WishlistError::UserNotFound);
        }

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let stored = self.wishlists.get(user_id).await?;
            let mut wishlist = Wishlist::from_optional(user_id, stored);

            let outcome = if wishlist.remove(product_id).is_some() {
                ToggleOutcome::Removed
            } else {
                let product = self
                    .products
                    .get(product_id)
                    .await?
                    .ok_or(WishlistError::ProductNotFound)?;
                wishlist.insert(WishlistEntry::from(&product));
                ToggleOutcome::Added
            };

            match self
                .wishlists
                .save(user_id, wishlist.entries(), wishlist.revision())
                .await
            {
                Ok(revision) => {
                    tracing::info!(?outcome, revision, "Wishlist toggled");
                    return Ok(outcome);
                }
                Err(RepositoryError::Conflict(reason)) => {
                    tracing::debug!(attempt, %reason, "Wishlist write conflict");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::warn!("Wishlist toggle gave up after repeated conflicts");
        Err(WishlistError::Conflict)
    }

    /// The user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `WishlistNotFound` if the user has never toggled anything.
    pub async fn get(&self, user_id: UserId) -> Result<Wishlist, WishlistError> {
        self.wishlists
            .get(user_id)
            .await?
            .map(|stored| Wishlist::from_stored(user_id, stored))
            .ok_or(WishlistError::WishlistNotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use shopzify_core::Email;
    use shopzify_core::api::NewProduct;

    use super::*;
    use crate::db::Revisioned;
    use crate::db::memory::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        repos: Repositories,
        user: UserId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let repos = Repositories::memory(&store);
        let user = repos
            .users
            .create_with_password("Ada", &Email::parse("ada@example.com").unwrap(), "hash")
            .await
            .unwrap()
            .id;
        Fixture { store, repos, user }
    }

    async fn add_product(repos: &Repositories, name: &str) -> ProductId {
        repos
            .products
            .create(&NewProduct {
                image: format!("{name}.png"),
                name: name.to_owned(),
                discounted_price: Decimal::from(90),
                original_price: Decimal::from(100),
                description: "soft cotton".to_owned(),
                quantity: 5,
                gender: "female".to_owned(),
                category: "tops".to_owned(),
                status: true,
                badge: None,
            })
            .await
            .unwrap()
            .id
    }

    fn ids(wishlist: &Wishlist) -> Vec<ProductId> {
        wishlist.entries().iter().map(|e| e.product_id).collect()
    }

    #[tokio::test]
    async fn test_first_toggle_creates_wishlist_with_snapshot() {
        let f = fixture().await;
        let p = add_product(&f.repos, "Tee").await;
        let service = WishlistService::new(&f.repos);

        assert!(matches!(
            service.get(f.user).await,
            Err(WishlistError::WishlistNotFound)
        ));

        let outcome = service.toggle(f.user, p).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Added);
        assert_eq!(outcome.message(), "Product added to wishlist");

        let wishlist = service.get(f.user).await.unwrap();
        let entry = &wishlist.entries()[0];
        assert_eq!(entry.product_id, p);
        assert_eq!(entry.name, "Tee");
        assert_eq!(entry.discounted_price, Decimal::from(90));
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_membership() {
        let f = fixture().await;
        let a = add_product(&f.repos, "A").await;
        let b = add_product(&f.repos, "B").await;
        let service = WishlistService::new(&f.repos);

        service.toggle(f.user, a).await.unwrap();
        service.toggle(f.user, b).await.unwrap();
        let outcome = service.toggle(f.user, a).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Removed);
        assert_eq!(ids(&service.get(f.user).await.unwrap()), vec![b]);

        service.toggle(f.user, a).await.unwrap();
        assert_eq!(ids(&service.get(f.user).await.unwrap()), vec![b, a]);
    }

    #[tokio::test]
    async fn test_unknown_user_and_product() {
        let f = fixture().await;
        let service = WishlistService::new(&f.repos);

        assert!(matches!(
            service.toggle(UserId::new(999), ProductId::new(1)).await,
            Err(WishlistError::UserNotFound)
        ));
        assert!(matches!(
            service.toggle(f.user, ProductId::new(999)).await,
            Err(WishlistError::ProductNotFound)
        ));
        // Nothing was persisted
        assert!(WishlistRepository::get(f.store.as_ref(), f.user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_product_leaves_existing_wishlist_untouched() {
        let f = fixture().await;
        let kept = add_product(&f.repos, "Kept").await;
        let service = WishlistService::new(&f.repos);
        service.toggle(f.user, kept).await.unwrap();
        let before = WishlistRepository::get(f.store.as_ref(), f.user)
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(
            service.toggle(f.user, ProductId::new(999)).await,
            Err(WishlistError::ProductNotFound)
        ));

        let after = WishlistRepository::get(f.store.as_ref(), f.user)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after, before);
        assert_eq!(ids(&service.get(f.user).await.unwrap()), vec![kept]);
    }

    #[tokio::test]
    async fn test_removing_deleted_product_still_works() {
        let f = fixture().await;
        let p = add_product(&f.repos, "Gone").await;
        let service = WishlistService::new(&f.repos);

        service.toggle(f.user, p).await.unwrap();
        f.repos.products.delete(p).await.unwrap();

        assert_eq!(service.toggle(f.user, p).await.unwrap(), ToggleOutcome::Removed);
        assert!(service.get(f.user).await.unwrap().is_empty());
    }

    /// Lets another writer slip in before the first `interleave` saves.
    struct Interleaving {
        inner: Arc<MemoryStore>,
        interleave: AtomicUsize,
        intruder: WishlistEntry,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl WishlistRepository for Interleaving {
        async fn get(
            &self,
            user_id: UserId,
        ) -> Result<Option<Revisioned<Vec<WishlistEntry>>>, RepositoryError> {
            WishlistRepository::get(self.inner.as_ref(), user_id).await
        }

        async fn save(
            &self,
            user_id: UserId,
            entries: &[WishlistEntry],
            expected: Option<i64>,
        ) -> Result<i64, RepositoryError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self
                .interleave
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                let current = WishlistRepository::get(self.inner.as_ref(), user_id).await?;
                let mut wishlist = Wishlist::from_optional(user_id, current);
                let mut intruder = self.intruder.clone();
                intruder.product_id = ProductId::new(1000 + i32::try_from(wishlist.len()).unwrap());
                wishlist.insert(intruder);
                WishlistRepository::save(
                    self.inner.as_ref(),
                    user_id,
                    wishlist.entries(),
                    wishlist.revision(),
                )
                .await?;
            }
            WishlistRepository::save(self.inner.as_ref(), user_id, entries, expected).await
        }
    }

    async fn interleaving_repos(f: &Fixture, conflicts: usize) -> (Repositories, Arc<Interleaving>) {
        let p = add_product(&f.repos, "Intruder").await;
        let intruder = WishlistEntry::from(&f.repos.products.get(p).await.unwrap().unwrap());
        let wishlists = Arc::new(Interleaving {
            inner: f.store.clone(),
            interleave: AtomicUsize::new(conflicts),
            intruder,
            saves: AtomicUsize::new(0),
        });
        let repos = Repositories {
            wishlists: wishlists.clone(),
            ..f.repos.clone()
        };
        (repos, wishlists)
    }

    #[tokio::test]
    async fn test_conflicting_write_is_retried_without_losing_either_toggle() {
        let f = fixture().await;
        let p = add_product(&f.repos, "Mine").await;
        let (repos, wishlists) = interleaving_repos(&f, 1).await;
        let service = WishlistService::new(&repos);

        assert_eq!(service.toggle(f.user, p).await.unwrap(), ToggleOutcome::Added);
        assert_eq!(wishlists.saves.load(Ordering::SeqCst), 2);

        let wishlist = service.get(f.user).await.unwrap();
        assert_eq!(wishlist.len(), 2);
        assert!(wishlist.contains(p));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let f = fixture().await;
        let p = add_product(&f.repos, "Mine").await;
        let (repos, wishlists) = interleaving_repos(&f, MAX_WRITE_ATTEMPTS as usize).await;
        let service = WishlistService::new(&repos);

        assert!(matches!(
            service.toggle(f.user, p).await,
            Err(WishlistError::Conflict)
        ));
        assert_eq!(wishlists.saves.load(Ordering::SeqCst), MAX_WRITE_ATTEMPTS as usize);
        assert!(!service.get(f.user).await.unwrap().contains(p));
    }
}
