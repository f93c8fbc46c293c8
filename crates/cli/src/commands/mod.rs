//! Subcommand implementations.

pub mod migrate;
pub mod seed;

use thiserror::Error;

use shopzify_storefront::config::ConfigError;
use shopzify_storefront::db::RepositoryError;
use shopzify_storefront::services::catalog::CatalogError;

/// Errors from any CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("session store error: {0}")]
    SessionStore(String),

    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Connect to the storefront database named by the environment.
async fn connect() -> Result<sqlx::PgPool, CommandError> {
    let database_url = shopzify_storefront::config::database_url_from_env()?;
    tracing::info!("Connecting to storefront database...");
    Ok(shopzify_storefront::db::create_pool(&database_url).await?)
}
