//! Shopzify CLI - database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations (including the session table)
//! shopzify-cli migrate storefront
//!
//! # Load products and navigation menus from YAML
//! shopzify-cli seed products crates/cli/seed/products.yaml
//! shopzify-cli seed menus crates/cli/seed/menus.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shopzify-cli")]
#[command(author, version, about = "Shopzify CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Load catalog data from YAML files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run storefront database migrations
    Storefront,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products, skipping names that already exist
    Products {
        /// Path to the YAML product list
        file: String,
    },
    /// Replace the navigation menus
    Menus {
        /// Path to the YAML menu list
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
            SeedTarget::Menus { file } => commands::seed::menus(&file).await?,
        },
    }
    Ok(())
}
