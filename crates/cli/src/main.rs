//! Zestify CLI - Database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations (includes the session table)
//! zestify migrate
//!
//! # Create the default categories and file existing products under them
//! zestify seed categories
//!
//! # Insert the demo catalog, downloading product images into the media dir
//! zestify seed products
//! zestify seed products --skip-images
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed categories` - Default categories plus keyword auto-assignment
//! - `seed products` - Demo products

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "zestify")]
#[command(author, version, about = "Zestify CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Create default categories and assign existing products by keyword
    ///
    /// Headphone and speaker names are matched first and go to Music, ahead
    /// of the generic "phone" rule for Smartphone.
    Categories,
    /// Insert the demo products, skipping any that already exist
    ///
    /// Products whose image download fails are still created, without an
    /// image.
    Products {
        /// Do not download product images
        #[arg(long)]
        skip_images: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Categories => commands::seed::categories().await?,
            SeedTarget::Products { skip_images } => {
                commands::seed::products(skip_images).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_products_flag() {
        let cli = Cli::try_parse_from(["zestify", "seed", "products", "--skip-images"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Seed {
                target: SeedTarget::Products { skip_images: true }
            })
        ));
    }
}
