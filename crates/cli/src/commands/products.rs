//! Catalog commands: bulk import, lookup and counter inspection.
//!
//! All commands talk to Firestore with the `FIREBASE_*` settings from the
//! environment (or `.env`).

#![allow(clippy::print_stdout)]

use std::path::Path;
use std::time::Duration;

use tracing::{error, info};

use emporium_core::LookupState;
use emporium_core::form::ProductForm;
use emporium_storefront::catalog::{
    FirestoreCatalog, ProductRepository, peek_next_product_id, resolve_product, submit_product,
};
use emporium_storefront::config::FirebaseConfig;
use emporium_storefront::firestore::FirestoreClient;

/// Reads are one-shot; the cache only needs to outlive a single command.
const CLI_CACHE_TTL: Duration = Duration::from_secs(30);

fn catalog() -> Result<FirestoreCatalog, Box<dyn std::error::Error>> {
    let config = FirebaseConfig::from_env()?;
    info!(project = %config.project_id, database = %config.database, "Using Firestore");
    Ok(FirestoreCatalog::new(
        FirestoreClient::new(&config),
        CLI_CACHE_TTL,
    ))
}

/// Import products from a JSON file holding an array of product forms.
///
/// Every form is validated before anything is written; one bad form aborts
/// the whole import. With `dry_run` nothing is written at all.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any form fails
/// validation, or a write fails. Products written before a failed write stay
/// in the catalog.
pub async fn import(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading product forms from file");
    let content = tokio::fs::read_to_string(path).await?;
    let forms: Vec<ProductForm> = serde_json::from_str(&content)?;
    info!(count = forms.len(), "Parsed product forms");

    let errors: Vec<String> = forms
        .iter()
        .enumerate()
        .filter_map(|(index, form)| {
            form.validate()
                .err()
                .map(|e| format!("#{index} ({}): {e}", form.name))
        })
        .collect();
    if !errors.is_empty() {
        error!("Product validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} invalid product forms", errors.len()).into());
    }

    if dry_run {
        info!("Dry run: all forms valid, nothing written");
        return Ok(());
    }

    let catalog = catalog()?;
    for form in &forms {
        let product = submit_product(&catalog, form).await?;
        info!(product_id = %product.id, name = %product.name, "Imported");
    }

    info!(count = forms.len(), "Import complete");
    Ok(())
}

/// Print the product matching an id or slug as JSON.
///
/// # Errors
///
/// Returns an error if no product matches or Firestore cannot be queried.
pub async fn show(slug: &str) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = catalog()?;
    match resolve_product(&catalog, slug).await {
        LookupState::Found(product) => {
            println!("{}", serde_json::to_string_pretty(&product)?);
            Ok(())
        }
        LookupState::NotFound => Err(format!("No product matches \"{slug}\"").into()),
        LookupState::Failed | LookupState::Loading => {
            Err("Failed to query Firestore; try again".into())
        }
    }
}

/// Print one line per product: id, price, name.
///
/// # Errors
///
/// Returns an error if Firestore cannot be queried.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = catalog()?;
    let products = catalog.list().await?;
    for product in &products {
        println!(
            "{}\t{}\t{}",
            product.id,
            product.price.display(),
            product.name
        );
    }
    info!(count = products.len(), "Listed products");
    Ok(())
}

/// Print the number the next imported product will receive.
///
/// # Errors
///
/// Returns an error if the counter cannot be read.
pub async fn next_id() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = catalog()?;
    println!("{}", peek_next_product_id(&catalog).await?);
    Ok(())
}
