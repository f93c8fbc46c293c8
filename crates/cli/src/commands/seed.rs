//! Seed the catalog and navigation menus from YAML files.
//!
//! Products go through the catalog service so they get the same
//! normalization and validation as `POST /product`. Sample files live in
//! `crates/cli/seed/`.

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use shopzify_core::api::{MenuItem, NewProduct};
use shopzify_storefront::db::{MenuRepository, ProductQuery, ProductRepository, Repositories};
use shopzify_storefront::services::catalog::CatalogService;

use super::{CommandError, connect};

/// Outcome of a product seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

async fn load_yaml<T: DeserializeOwned>(file_path: &str) -> Result<T, CommandError> {
    let content = tokio::fs::read_to_string(Path::new(file_path))
        .await
        .map_err(|source| CommandError::Read {
            path: file_path.to_owned(),
            source,
        })?;
    serde_yaml::from_str(&content).map_err(|source| CommandError::Yaml {
        path: file_path.to_owned(),
        source,
    })
}

/// Insert the products listed in `file_path`.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, the database is
/// unreachable, or a product fails validation.
pub async fn products(file_path: &str) -> Result<(), CommandError> {
    let products: Vec<NewProduct> = load_yaml(file_path).await?;
    info!(path = %file_path, count = products.len(), "Parsed product file");

    let pool = connect().await?;
    let repos = Repositories::postgres(&pool);
    let report = seed_products(repos.products.as_ref(), products).await?;

    info!("Seeding complete!");
    info!("  Products inserted: {}", report.inserted);
    info!("  Products skipped (name exists): {}", report.skipped);
    Ok(())
}

/// Replace the navigation menus with those listed in `file_path`.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid or the database is
/// unreachable.
pub async fn menus(file_path: &str) -> Result<(), CommandError> {
    let menus: Vec<MenuItem> = load_yaml(file_path).await?;
    if menus.is_empty() {
        warn!(path = %file_path, "Menu file is empty, clearing all menus");
    }

    let pool = connect().await?;
    let repos = Repositories::postgres(&pool);
    repos.menus.replace_all(&menus).await?;

    info!(count = menus.len(), "Menus replaced");
    Ok(())
}

/// Create each product whose name (case-insensitive) is not in the catalog.
///
/// # Errors
///
/// Returns an error if a repository call fails or a product is invalid.
/// Products created before the failure stay in the catalog.
pub async fn seed_products(
    repo: &dyn ProductRepository,
    products: Vec<NewProduct>,
) -> Result<SeedReport, CommandError> {
    let mut existing: HashSet<String> = repo
        .list(ProductQuery::default())
        .await?
        .into_iter()
        .map(|p| p.name.trim().to_lowercase())
        .collect();

    let catalog = CatalogService::new(repo);
    let mut report = SeedReport::default();
    for product in products {
        let key = product.name.trim().to_lowercase();
        if !existing.insert(key) {
            report.skipped += 1;
            continue;
        }
        catalog.create(product).await?;
        report.inserted += 1;
    }
    Ok(report)
}
