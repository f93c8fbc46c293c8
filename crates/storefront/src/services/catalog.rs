//! Product catalog: listing, search, navigation filters and admin writes.
//!
//! Matching runs over the loaded active products rather than in SQL so that
//! the search semantics do not depend on the database's regex dialect.

use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use shopzify_core::{Gender, ProductId};
use shopzify_core::api::{NewProduct, Product, ProductPatch};

use crate::db::{ProductQuery, ProductRepository, RepositoryError};

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Cannot find product")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Catalog operations over the product repository.
pub struct CatalogService<'a> {
    products: &'a dyn ProductRepository,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(products: &'a dyn ProductRepository) -> Self {
        Self { products }
    }

    /// Active products, optionally limited. A limit of zero or below means
    /// no limit.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the products cannot be read.
    pub async fn list_active(&self, limit: Option<i64>) -> Result<Vec<Product>, CatalogError> {
        let query = ProductQuery::active().limit(positive(limit));
        Ok(self.products.list(query).await?)
    }

    /// Every product including inactive ones.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the products cannot be read.
    pub async fn list_all(&self, limit: Option<i64>) -> Result<Vec<Product>, CatalogError> {
        let query = ProductQuery::all().limit(positive(limit));
        Ok(self.products.list(query).await?)
    }

    /// Free-text search over active products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the products cannot be read.
    #[instrument(skip(self))]
    pub async fn search(&self, key: &str) -> Result<Vec<Product>, CatalogError> {
        let matcher = SearchMatcher::new(key)?;
        let products = self.products.list(ProductQuery::active()).await?;
        Ok(products.into_iter().filter(|p| matcher.matches(p)).collect())
    }

    /// Active products whose category contains `key`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the products cannot be read.
    pub async fn by_category(&self, key: &str) -> Result<Vec<Product>, CatalogError> {
        let key = key.to_lowercase();
        let products = self.products.list(ProductQuery::active()).await?;
        Ok(products
            .into_iter()
            .filter(|p| p.category.to_lowercase().contains(&key))
            .collect())
    }

    /// Products behind a navigation menu entry.
    ///
    /// `men` and `women` select by gender, any other menu by category. The
    /// sublabel is only traced; it never narrows the result.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the products cannot be read.
    #[instrument(skip(self))]
    pub async fn by_nav(&self, menu: &str, sublabel: &str) -> Result<Vec<Product>, CatalogError> {
        let filter = NavFilter::new(menu);
        let products = self.products.list(ProductQuery::active()).await?;
        Ok(products.into_iter().filter(|p| filter.matches(p)).collect())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if a field is out of range.
    #[instrument(skip_all, fields(name = %product.name))]
    pub async fn create(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let product = normalize_new(product);
        validate(
            Some(&product.name),
            Some(product.discounted_price),
            Some(product.original_price),
            Some(product.quantity),
        )?;

        let created = self.products.create(&product).await?;
        tracing::info!(product_id = %created.id, "Product created");
        Ok(created)
    }

    /// Apply the set fields of `patch`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no product has this id.
    /// - `Validation` if a set field is out of range.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, CatalogError> {
        let patch = normalize_patch(patch);
        validate(
            patch.name.as_deref(),
            patch.discounted_price,
            patch.original_price,
            patch.quantity,
        )?;

        self.products
            .update(id, &patch)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Delete a product.
    ///
    /// Wishlist and cart snapshots of it are left in place.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has this id.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        if self.products.delete(id).await? {
            tracing::info!("Product deleted");
            Ok(())
        } else {
            Err(CatalogError::NotFound)
        }
    }
}

/// Compiled search key.
struct SearchMatcher {
    text: Regex,
    gender: Regex,
    gender_only: bool,
}

impl SearchMatcher {
    fn new(key: &str) -> Result<Self, CatalogError> {
        let key = key.trim();
        let text = build_regex(&whitespace_tolerant(key))?;

        let (gender, gender_only) = match Gender::from_menu(key) {
            Some(gender) => (build_regex(&format!(r"\b{gender}\b"))?, true),
            None => (text.clone(), false),
        };

        Ok(Self {
            text,
            gender,
            gender_only,
        })
    }

    fn matches(&self, product: &Product) -> bool {
        if self.gender.is_match(&product.gender) {
            return true;
        }
        !self.gender_only
            && (self.text.is_match(&product.name)
                || self.text.is_match(&product.description)
                || self.text.is_match(&product.category))
    }
}

/// Escape `key` and let each run of whitespace match any whitespace.
fn whitespace_tolerant(key: &str) -> String {
    key.split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

fn build_regex(pattern: &str) -> Result<Regex, CatalogError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| CatalogError::Validation(format!("Invalid search key: {e}")))
}

/// Navigation filter for a `/nav/{menu}/{sublabel}` menu.
#[derive(Debug, PartialEq, Eq)]
enum NavFilter {
    Gender(Gender),
    Category(String),
}

impl NavFilter {
    fn new(menu: &str) -> Self {
        let menu = menu.trim().to_lowercase();
        match Gender::from_menu(&menu) {
            Some(gender) => Self::Gender(gender),
            None => Self::Category(menu),
        }
    }

    fn matches(&self, product: &Product) -> bool {
        match self {
            Self::Gender(gender) => product.gender.eq_ignore_ascii_case(gender.as_str()),
            Self::Category(menu) => product.category.eq_ignore_ascii_case(menu),
        }
    }
}

/// A limit of zero or below means no limit.
fn positive(limit: Option<i64>) -> Option<i64> {
    limit.filter(|&n| n > 0)
}

fn normalize_new(mut product: NewProduct) -> NewProduct {
    product.name = product.name.trim().to_owned();
    product.description = product.description.to_lowercase();
    product.category = product.category.to_lowercase();
    product
}

fn normalize_patch(mut patch: ProductPatch) -> ProductPatch {
    patch.name = patch.name.map(|n| n.trim().to_owned());
    patch.description = patch.description.map(|d| d.to_lowercase());
    patch.category = patch.category.map(|c| c.to_lowercase());
    patch
}

fn validate(
    name: Option<&str>,
    discounted_price: Option<Decimal>,
    original_price: Option<Decimal>,
    quantity: Option<i32>,
) -> Result<(), CatalogError> {
    if name.is_some_and(str::is_empty) {
        return Err(CatalogError::Validation("Product name is required".to_owned()));
    }
    if discounted_price.is_some_and(|p| p.is_sign_negative())
        || original_price.is_some_and(|p| p.is_sign_negative())
    {
        return Err(CatalogError::Validation("Prices cannot be negative".to_owned()));
    }
    if quantity.is_some_and(|q| q < 0) {
        return Err(CatalogError::Validation("Quantity cannot be negative".to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::memory::MemoryStore;

    fn new_product(name: &str, description: &str, gender: &str, category: &str) -> NewProduct {
        NewProduct {
            image: format!("{name}.png"),
            name: name.to_owned(),
            discounted_price: Decimal::from(10),
            original_price: Decimal::from(12),
            description: description.to_owned(),
            quantity: 4,
            gender: gender.to_owned(),
            category: category.to_owned(),
            status: true,
            badge: None,
        }
    }

    async fn seeded() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let catalog = CatalogService::new(store.as_ref());
        for p in [
            new_product("Oxford Shirt", "Crisp cotton  shirt", "male", "Shirts"),
            new_product("Wrap Dress", "Summer dress", "female", "dresses"),
            new_product("Linen Shirt", "Loose linen (relaxed)", "female", "shirts"),
            new_product("Trainers", "Everyday shoes", "unisex", "shoes"),
            new_product("Garment Bag", "Folds into a carry-on", "unisex", "menswear"),
        ] {
            catalog.create(p).await.unwrap();
        }
        let mut hidden = new_product("Old Shirt", "retired", "male", "shirts");
        hidden.status = false;
        catalog.create(hidden).await.unwrap();
        store
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_lowercases_description_and_category() {
        let store = seeded().await;
        let catalog = CatalogService::new(store.as_ref());
        let all = catalog.list_all(None).await.unwrap();
        assert_eq!(all[0].category, "shirts");
        assert_eq!(all[0].description, "crisp cotton  shirt");
        assert_eq!(all.len(), 6);
        assert_eq!(catalog.list_active(None).await.unwrap().len(), 5);
        assert_eq!(catalog.list_active(Some(2)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_non_positive_limit_means_no_limit() {
        let store = seeded().await;
        let catalog = CatalogService::new(store.as_ref());

        assert_eq!(catalog.list_active(Some(0)).await.unwrap().len(), 5);
        assert_eq!(catalog.list_active(Some(-1)).await.unwrap().len(), 5);
        assert_eq!(catalog.list_all(Some(0)).await.unwrap().len(), 6);
        assert_eq!(catalog.list_all(Some(-3)).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_search_matches_fields_case_insensitively() {
        let store = seeded().await;
        let catalog = CatalogService::new(store.as_ref());

        assert_eq!(
            names(&catalog.search("SHIRT").await.unwrap()),
            vec!["Oxford Shirt", "Linen Shirt"]
        );
        assert_eq!(
            names(&catalog.search("unisex").await.unwrap()),
            vec!["Trainers", "Garment Bag"]
        );
        // Whitespace runs match any whitespace
        assert_eq!(
            names(&catalog.search("cotton shirt").await.unwrap()),
            vec!["Oxford Shirt"]
        );
        // Metacharacters are literal
        assert_eq!(
            names(&catalog.search("(relaxed)").await.unwrap()),
            vec!["Linen Shirt"]
        );
        assert!(catalog.search("[").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_gender_synonyms() {
        let store = seeded().await;
        let catalog = CatalogService::new(store.as_ref());

        // "menswear" contains "men" but the synonym only looks at gender
        assert_eq!(names(&catalog.search("men").await.unwrap()), vec!["Oxford Shirt"]);
        assert_eq!(
            names(&catalog.search("menswear").await.unwrap()),
            vec!["Garment Bag"]
        );
        assert_eq!(
            names(&catalog.search("Women").await.unwrap()),
            vec!["Wrap Dress", "Linen Shirt"]
        );
    }

    #[tokio::test]
    async fn test_category_and_nav_filters() {
        let store = seeded().await;
        let catalog = CatalogService::new(store.as_ref());

        assert_eq!(
            names(&catalog.by_category("SHIRT").await.unwrap()),
            vec!["Oxford Shirt", "Linen Shirt"]
        );
        assert_eq!(
            names(&catalog.by_nav("women", "undefined").await.unwrap()),
            vec!["Wrap Dress", "Linen Shirt"]
        );
        // Gender menus ignore the sublabel
        assert_eq!(
            names(&catalog.by_nav("Women", "Dresses").await.unwrap()),
            vec!["Wrap Dress", "Linen Shirt"]
        );
        assert_eq!(names(&catalog.by_nav("shoes", "running").await.unwrap()), vec!["Trainers"]);
    }

    #[test]
    fn test_nav_filter_parsing() {
        assert_eq!(NavFilter::new("MEN"), NavFilter::Gender(Gender::Male));
        assert_eq!(NavFilter::new(" women "), NavFilter::Gender(Gender::Female));
        assert_eq!(NavFilter::new("Shoes"), NavFilter::Category("shoes".to_owned()));
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_product() {
        let store = seeded().await;
        let catalog = CatalogService::new(store.as_ref());

        let updated = catalog
            .update(
                ProductId::new(1),
                ProductPatch {
                    category: Some("Formal".to_owned()),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.category, "formal");

        assert!(matches!(
            catalog.update(ProductId::new(99), ProductPatch::default()).await,
            Err(CatalogError::NotFound)
        ));
        catalog.delete(ProductId::new(1)).await.unwrap();
        assert!(matches!(
            catalog.delete(ProductId::new(1)).await,
            Err(CatalogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_rejects_negative_values() {
        let store = Arc::new(MemoryStore::new());
        let catalog = CatalogService::new(store.as_ref());
        let mut product = new_product("Hat", "wool", "unisex", "hats");
        product.quantity = -1;
        assert!(matches!(
            catalog.create(product).await,
            Err(CatalogError::Validation(_))
        ));
    }
}
