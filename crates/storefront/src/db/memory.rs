//! In-memory implementation of every repository.
//!
//! Used by the route and service tests and by the end-to-end tests, which run
//! the real router without a database. Honors the same revision contract as
//! the `PostgreSQL` documents.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use shopzify_core::api::{
    CartItem, Checkout, MenuItem, NewProduct, Product, ProductPatch, WishlistEntry,
};
use shopzify_core::{CheckoutId, Email, ProductId, UserId};

use super::{
    CartRepository, CheckoutRepository, MenuRepository, NewCheckout, ProductQuery,
    ProductRepository, RepositoryError, Revisioned, UserRepository, WishlistRepository,
};
use crate::models::user::User;

#[derive(Default)]
struct Inner {
    products: Vec<Product>,
    users: Vec<(User, String)>,
    wishlists: HashMap<UserId, Revisioned<Vec<WishlistEntry>>>,
    carts: HashMap<UserId, Revisioned<Vec<CartItem>>>,
    checkouts: Vec<Checkout>,
    menus: Vec<MenuItem>,
    next_product_id: i32,
    next_user_id: i32,
    next_checkout_id: i32,
}

/// Process-local store behind a single lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Shared conditional-write rule for per-user documents.
fn save_document<T: Clone>(
    documents: &mut HashMap<UserId, Revisioned<Vec<T>>>,
    user_id: UserId,
    value: &[T],
    expected: Option<i64>,
) -> Result<i64, RepositoryError> {
    let current = documents.get(&user_id).map(|d| d.revision);
    if current != expected {
        return Err(RepositoryError::Conflict(format!(
            "document for user {user_id} changed since it was read"
        )));
    }

    let revision = current.unwrap_or(0) + 1;
    documents.insert(
        user_id,
        Revisioned {
            value: value.to_vec(),
            revision,
        },
    );
    Ok(revision)
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list(&self, query: ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let inner = self.inner.read().await;
        let limit = query
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);

        Ok(inner
            .products
            .iter()
            .filter(|p| !query.active_only || p.status)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.next_product_id += 1;

        let created = Product {
            id: ProductId::new(inner.next_product_id),
            image: product.image.clone(),
            name: product.name.clone(),
            discounted_price: product.discounted_price,
            original_price: product.original_price,
            description: product.description.clone(),
            quantity: product.quantity,
            gender: product.gender.clone(),
            category: product.category.clone(),
            status: product.status,
            badge: product.badge.clone(),
            record_date: Utc::now(),
        };
        inner.products.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut inner = self.inner.write().await;
        let Some(product) = inner.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(image) = &patch.image {
            product.image.clone_from(image);
        }
        if let Some(name) = &patch.name {
            product.name.clone_from(name);
        }
        if let Some(price) = patch.discounted_price {
            product.discounted_price = price;
        }
        if let Some(price) = patch.original_price {
            product.original_price = price;
        }
        if let Some(description) = &patch.description {
            product.description.clone_from(description);
        }
        if let Some(quantity) = patch.quantity {
            product.quantity = quantity;
        }
        if let Some(gender) = &patch.gender {
            product.gender.clone_from(gender);
        }
        if let Some(category) = &patch.category {
            product.category.clone_from(category);
        }
        if let Some(status) = patch.status {
            product.status = status;
        }
        if patch.badge.is_some() {
            product.badge.clone_from(&patch.badge);
        }

        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        let before = inner.products.len();
        inner.products.retain(|p| p.id != id);
        Ok(inner.products.len() != before)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|(u, _)| u.email.as_str().eq_ignore_ascii_case(email.as_str()))
            .cloned())
    }

    async fn create_with_password(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .iter()
            .any(|(u, _)| u.email.as_str().eq_ignore_ascii_case(email.as_str()))
        {
            return Err(RepositoryError::Conflict("user already exists".to_owned()));
        }

        inner.next_user_id += 1;
        let user = User {
            id: UserId::new(inner.next_user_id),
            name: name.to_owned(),
            email: email.clone(),
            created_at: Utc::now(),
        };
        inner.users.push((user.clone(), password_hash.to_owned()));
        Ok(user)
    }
}

#[async_trait]
impl WishlistRepository for MemoryStore {
    async fn get(
        &self,
        user_id: UserId,
    ) -> Result<Option<Revisioned<Vec<WishlistEntry>>>, RepositoryError> {
        Ok(self.inner.read().await.wishlists.get(&user_id).cloned())
    }

    async fn save(
        &self,
        user_id: UserId,
        entries: &[WishlistEntry],
        expected: Option<i64>,
    ) -> Result<i64, RepositoryError> {
        let mut inner = self.inner.write().await;
        save_document(&mut inner.wishlists, user_id, entries, expected)
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn get(
        &self,
        user_id: UserId,
    ) -> Result<Option<Revisioned<Vec<CartItem>>>, RepositoryError> {
        Ok(self.inner.read().await.carts.get(&user_id).cloned())
    }

    async fn save(
        &self,
        user_id: UserId,
        items: &[CartItem],
        expected: Option<i64>,
    ) -> Result<i64, RepositoryError> {
        let mut inner = self.inner.write().await;
        save_document(&mut inner.carts, user_id, items, expected)
    }
}

#[async_trait]
impl CheckoutRepository for MemoryStore {
    async fn create(&self, checkout: NewCheckout<'_>) -> Result<Checkout, RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.next_checkout_id += 1;

        let created = Checkout {
            id: CheckoutId::new(inner.next_checkout_id),
            user_id: checkout.user_id,
            products: checkout.products.to_vec(),
            address: checkout.address.clone(),
            summary: checkout.summary.clone(),
            created_at: checkout.created_at,
        };
        inner.checkouts.push(created.clone());
        Ok(created)
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<Checkout>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut checkouts: Vec<Checkout> = inner
            .checkouts
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        checkouts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_i32().cmp(&a.id.as_i32()))
        });
        Ok(checkouts)
    }
}

#[async_trait]
impl MenuRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        Ok(self.inner.read().await.menus.clone())
    }

    async fn replace_all(&self, items: &[MenuItem]) -> Result<(), RepositoryError> {
        self.inner.write().await.menus = items.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_document_revision_contract() {
        let store = MemoryStore::new();
        let user = UserId::new(1);

        // Insert only when absent
        let rev = WishlistRepository::save(&store, user, &[], None).await.unwrap();
        assert_eq!(rev, 1);
        let err = WishlistRepository::save(&store, user, &[], None).await;
        assert!(matches!(err, Err(RepositoryError::Conflict(_))));

        // Update only at the read revision
        let rev = WishlistRepository::save(&store, user, &[], Some(1)).await.unwrap();
        assert_eq!(rev, 2);
        let err = WishlistRepository::save(&store, user, &[], Some(1)).await;
        assert!(matches!(err, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_case_insensitively() {
        let store = MemoryStore::new();
        let email = Email::parse("ada@example.com").unwrap();
        store.create_with_password("Ada", &email, "hash").await.unwrap();

        let upper = Email::parse("ADA@example.com").unwrap();
        let err = store.create_with_password("Ada", &upper, "hash").await;
        assert!(matches!(err, Err(RepositoryError::Conflict(_))));
    }
}
