//! Product catalog.
//!
//! [`ProductRepository`] is the seam between handlers and wherever products
//! are stored. [`FirestoreCatalog`] is the production implementation;
//! [`InMemoryCatalog`] backs tests and local runs.
//!
//! Everything that leaves a repository has been through
//! [`emporium_core::normalize_product`], so callers only ever see fully
//! defaulted products.

mod cache;
mod firestore;
mod memory;

pub use firestore::FirestoreCatalog;
pub use memory::InMemoryCatalog;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use emporium_core::form::{ProductDocument, ProductForm, ValidationError};
use emporium_core::{LookupState, Product};

use crate::firestore::FirestoreError;

/// Collection holding products.
pub const PRODUCTS: &str = "products";

/// Most products shown on the featured shelf.
pub const FEATURED_LIMIT: usize = 8;

/// Most products shown on the discounted shelf.
pub const DISCOUNTED_LIMIT: usize = 12;

/// Errors from a product repository.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The Firestore backend failed.
    #[error("Firestore error: {0}")]
    Firestore(#[from] FirestoreError),

    /// The backend could not be reached.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Errors from submitting a new product.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The form was rejected before anything was written.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The catalog failed while assigning an id or writing the product.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Storage for products and the product number counter.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fetch a product by document id.
    async fn get_by_id(&self, id: &str) -> Result<Option<Product>, CatalogError>;

    /// Fetch the first product whose `meta.url` equals `slug`.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError>;

    /// Every product.
    async fn list(&self) -> Result<Vec<Product>, CatalogError>;

    /// Store a new product and return it as it will be read back.
    async fn insert(&self, document: ProductDocument) -> Result<Product, CatalogError>;

    /// Current value of the product number counter, `None` if it was never
    /// written.
    async fn counter(&self) -> Result<Option<u64>, CatalogError>;

    /// Overwrite the product number counter.
    async fn set_counter(&self, value: u64) -> Result<(), CatalogError>;
}

// =============================================================================
// Lookup
// =============================================================================

/// Resolve a product page path to a product.
///
/// The path is tried as a document id first, then as a slug. A failed id
/// lookup is not fatal (the path may simply not be a valid id); a failed slug
/// query is.
#[instrument(skip(repo))]
pub async fn resolve_product(repo: &dyn ProductRepository, slug: &str) -> LookupState {
    let slug = slug.trim_matches('/');
    if slug.is_empty() {
        return LookupState::NotFound;
    }

    match repo.get_by_id(slug).await {
        Ok(Some(product)) => return LookupState::Found(Box::new(product)),
        Ok(None) => {}
        Err(e) => tracing::debug!(error = %e, "Id lookup failed, trying slug"),
    }

    match repo.find_by_slug(slug).await {
        Ok(Some(product)) => LookupState::Found(Box::new(product)),
        Ok(None) => LookupState::NotFound,
        Err(e) => {
            tracing::error!(error = %e, "Failed to look up product");
            LookupState::Failed
        }
    }
}

// =============================================================================
// Listing
// =============================================================================

/// The home page shelves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub all: Vec<Product>,
    /// Products with their own images and a price, at most [`FEATURED_LIMIT`].
    pub featured: Vec<Product>,
    /// Products advertising a discount, at most [`DISCOUNTED_LIMIT`].
    pub discounted: Vec<Product>,
}

impl Listing {
    /// Sort products onto shelves, keeping catalog order.
    #[must_use]
    pub fn from_products(all: Vec<Product>) -> Self {
        let featured = all
            .iter()
            .filter(|p| p.is_featurable())
            .take(FEATURED_LIMIT)
            .cloned()
            .collect();
        let discounted = all
            .iter()
            .filter(|p| p.is_discounted())
            .take(DISCOUNTED_LIMIT)
            .cloned()
            .collect();

        Self {
            all,
            featured,
            discounted,
        }
    }
}

// =============================================================================
// Submission
// =============================================================================

/// Take the next product number: 1 if the counter was never written,
/// otherwise one more than its current value. The new value is written back.
///
/// The read and write are not atomic; two concurrent submissions can receive
/// the same number.
///
/// # Errors
///
/// Returns `CatalogError` if the counter cannot be read or written.
#[instrument(skip(repo))]
pub async fn next_product_id(repo: &dyn ProductRepository) -> Result<u64, CatalogError> {
    let next = peek_next_product_id(repo).await?;
    repo.set_counter(next).await?;
    Ok(next)
}

/// The number [`next_product_id`] would hand out, without taking it.
///
/// # Errors
///
/// Returns `CatalogError` if the counter cannot be read.
pub async fn peek_next_product_id(repo: &dyn ProductRepository) -> Result<u64, CatalogError> {
    Ok(repo
        .counter()
        .await?
        .map_or(1, |value| value.saturating_add(1)))
}

/// Validate a product form, number it, and store it.
///
/// # Errors
///
/// Returns `SubmitError::Invalid` before touching the catalog if the form is
/// rejected, or `SubmitError::Catalog` if numbering or storing fails.
#[instrument(skip(repo, form), fields(name = %form.name))]
pub async fn submit_product(
    repo: &dyn ProductRepository,
    form: &ProductForm,
) -> Result<Product, SubmitError> {
    let product = form.validate()?;
    let id = next_product_id(repo).await?;

    let stored = repo
        .insert(ProductDocument {
            id,
            product,
            created_at: Utc::now(),
        })
        .await?;

    tracing::info!(product_id = %stored.id, number = id, "Product added");
    Ok(stored)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_core::form::FormMeta;
    use emporium_core::{Price, ProductId, ProductImage, RawProduct, normalize_product};
    use serde_json::json;

    use super::*;

    fn product(id: &str, value: serde_json::Value) -> Product {
        normalize_product(RawProduct::from(value), id)
    }

    fn red_shoes() -> Product {
        product(
            "doc-1",
            json!({
                "name": "Red Shoes",
                "price": 49.9,
                "images": [{ "url": "https://cdn.example/red.png", "priority": 1 }],
                "meta": { "url": "red-shoes" }
            }),
        )
    }

    #[tokio::test]
    async fn test_resolve_by_id_then_slug() {
        let catalog = InMemoryCatalog::with_products(vec![red_shoes()]);

        let by_id = resolve_product(&catalog, "doc-1").await;
        assert_eq!(by_id.product().unwrap().name, "Red Shoes");

        let by_slug = resolve_product(&catalog, "red-shoes").await;
        assert_eq!(by_slug.product().unwrap().id, ProductId::new("doc-1"));
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found_rather_than_loading() {
        let catalog = InMemoryCatalog::with_products(vec![red_shoes()]);

        let state = resolve_product(&catalog, "blue-hat").await;
        assert_eq!(state, LookupState::NotFound);
        assert_ne!(state, LookupState::Loading);
        assert_eq!(resolve_product(&catalog, "/").await, LookupState::NotFound);
    }

    #[tokio::test]
    async fn test_multi_segment_slug() {
        let shoes = product(
            "doc-2",
            json!({ "name": "Trail", "price": 80, "meta": { "url": "shoes/trail" } }),
        );
        let catalog = InMemoryCatalog::with_products(vec![shoes]);
        let state = resolve_product(&catalog, "shoes/trail/").await;
        assert_eq!(state.product().unwrap().id.as_str(), "doc-2");
    }

    #[tokio::test]
    async fn test_unavailable_catalog_fails() {
        let catalog = InMemoryCatalog::unavailable();
        assert_eq!(
            resolve_product(&catalog, "red-shoes").await,
            LookupState::Failed
        );
    }

    #[test]
    fn test_listing_shelves() {
        let mut products = vec![
            red_shoes(),
            product("no-image", json!({ "name": "Bare", "price": 5 })),
            product(
                "free",
                json!({ "price": 0, "images": [{ "url": "https://cdn.example/f.png" }] }),
            ),
            product("sale", json!({ "price": 10, "discountPercent": 20 })),
        ];
        for i in 0..12 {
            products.push(product(
                &format!("bulk-{i}"),
                json!({
                    "price": 1,
                    "discountPercent": 5,
                    "images": [{ "url": "https://cdn.example/b.png" }]
                }),
            ));
        }

        let listing = Listing::from_products(products);
        assert_eq!(listing.all.len(), 16);
        assert_eq!(listing.featured.len(), FEATURED_LIMIT);
        assert_eq!(listing.featured[0].id.as_str(), "doc-1");
        assert!(listing.featured.iter().all(Product::is_featurable));
        assert_eq!(listing.discounted.len(), DISCOUNTED_LIMIT);
        assert_eq!(listing.discounted[0].id.as_str(), "sale");
    }

    #[tokio::test]
    async fn test_next_product_id_starts_at_one_and_increments() {
        let catalog = InMemoryCatalog::new();
        assert_eq!(peek_next_product_id(&catalog).await.unwrap(), 1);
        assert_eq!(next_product_id(&catalog).await.unwrap(), 1);
        assert_eq!(catalog.counter().await.unwrap(), Some(1));
        assert_eq!(next_product_id(&catalog).await.unwrap(), 2);
        assert_eq!(peek_next_product_id(&catalog).await.unwrap(), 3);
        assert_eq!(catalog.counter().await.unwrap(), Some(2));
    }

    fn form() -> ProductForm {
        ProductForm {
            name: "Blue Hat".to_owned(),
            introduction_html: "<p>Hat</p>".to_owned(),
            description_html: "<p>Blue</p>".to_owned(),
            price: "12.00".to_owned(),
            images: vec![ProductImage {
                url: "https://cdn.example/hat.png".to_owned(),
                priority: 0,
            }],
            meta: FormMeta {
                url: "blue-hat".to_owned(),
                ..FormMeta::default()
            },
            ..ProductForm::default()
        }
    }

    #[tokio::test]
    async fn test_submit_product_is_findable_by_slug() {
        let catalog = InMemoryCatalog::new();
        let stored = submit_product(&catalog, &form()).await.unwrap();
        assert_eq!(stored.price, Price::from_cents(1200));

        let state = resolve_product(&catalog, "blue-hat").await;
        assert_eq!(state.product().unwrap().id, stored.id);
        assert_eq!(catalog.counter().await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_rejected_form_does_not_touch_catalog() {
        let catalog = InMemoryCatalog::new();
        let mut bad = form();
        bad.price = "0".to_owned();

        let err = submit_product(&catalog, &bad).await.unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(ValidationError::InvalidPrice)));
        assert_eq!(catalog.counter().await.unwrap(), None);
        assert!(catalog.list().await.unwrap().is_empty());
    }
}
