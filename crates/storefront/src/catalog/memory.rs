//! In-memory catalog.

use async_trait::async_trait;
use tokio::sync::RwLock;

use emporium_core::form::ProductDocument;
use emporium_core::{Product, RawProduct, normalize_product};

use super::{CatalogError, ProductRepository};

/// Product catalog held in memory, for tests and local runs.
///
/// New products get document ids `doc-1`, `doc-2`, ... in insertion order and
/// go through the same normalization as products read from Firestore.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<Vec<Product>>,
    counter: RwLock<Option<u64>>,
    unavailable: bool,
}

impl InMemoryCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding `products`, in order.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
            ..Self::default()
        }
    }

    /// A catalog whose every call fails, standing in for an unreachable
    /// backend.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), CatalogError> {
        if self.unavailable {
            return Err(CatalogError::Unavailable("in-memory catalog offline".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalog {
    async fn get_by_id(&self, id: &str) -> Result<Option<Product>, CatalogError> {
        self.check()?;
        Ok(self
            .products
            .read()
            .await
            .iter()
            .find(|p| p.id.as_str() == id)
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError> {
        self.check()?;
        Ok(self
            .products
            .read()
            .await
            .iter()
            .find(|p| p.meta.url.as_deref() == Some(slug))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        self.check()?;
        Ok(self.products.read().await.clone())
    }

    async fn insert(&self, document: ProductDocument) -> Result<Product, CatalogError> {
        self.check()?;
        let raw = serde_json::to_value(&document)
            .map(RawProduct::from)
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        let mut products = self.products.write().await;
        let product = normalize_product(raw, format!("doc-{}", products.len() + 1));
        products.push(product.clone());
        Ok(product)
    }

    async fn counter(&self) -> Result<Option<u64>, CatalogError> {
        self.check()?;
        Ok(*self.counter.read().await)
    }

    async fn set_counter(&self, next: u64) -> Result<(), CatalogError> {
        self.check()?;
        *self.counter.write().await = Some(next);
        Ok(())
    }
}
