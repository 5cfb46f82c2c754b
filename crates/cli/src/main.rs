//! Emporium CLI - catalog management tools.
//!
//! # Usage
//!
//! ```bash
//! # Validate and import products from a JSON array of product forms
//! emporium-cli products import products.json
//!
//! # Validate only
//! emporium-cli products import products.json --dry-run
//!
//! # Show a product by id or slug
//! emporium-cli products show red-shoes
//!
//! # List every product
//! emporium-cli products list
//!
//! # Show the number the next product will get
//! emporium-cli products next-id
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "emporium-cli")]
#[command(author, version, about = "Emporium CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Validate and import products from a JSON file
    Import {
        /// Path to a JSON array of product forms
        file: String,

        /// Validate only; write nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Show a product by document id or slug
    Show {
        /// Document id or slug (may contain '/')
        slug: String,
    },
    /// List every product
    List,
    /// Show the number the next product will get
    NextId,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

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
        Commands::Products { action } => match action {
            ProductAction::Import { file, dry_run } => {
                commands::products::import(&file, dry_run).await?;
            }
            ProductAction::Show { slug } => commands::products::show(&slug).await?,
            ProductAction::List => commands::products::list().await?,
            ProductAction::NextId => commands::products::next_id().await?,
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
    fn test_import_dry_run_flag() {
        let cli =
            Cli::try_parse_from(["emporium-cli", "products", "import", "p.json", "--dry-run"]);
        assert!(matches!(
            cli.map(|cli| cli.command),
            Ok(Commands::Products {
                action: ProductAction::Import { dry_run: true, .. }
            })
        ));
    }

    #[test]
    fn test_show_accepts_nested_slug() {
        let cli = Cli::try_parse_from(["emporium-cli", "products", "show", "hats/blue"]);
        assert!(matches!(
            cli.map(|cli| cli.command),
            Ok(Commands::Products {
                action: ProductAction::Show { slug }
            }) if slug == "hats/blue"
        ));
    }
}
