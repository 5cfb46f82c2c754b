//! Firestore-backed catalog.
//!
//! Caches products, slug lookups, and the full listing using `moka`. Only
//! hits are cached; a miss is asked again next time. Any write clears the
//! whole cache.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::json;
use tracing::{debug, instrument, warn};

use emporium_core::form::ProductDocument;
use emporium_core::{Product, RawProduct, normalize_product};

use super::cache::{CacheKey, CacheValue};
use super::{CatalogError, PRODUCTS, ProductRepository};
use crate::firestore::{Document, FirestoreClient, FirestoreError, value};

/// Collection holding counters.
const COUNTERS: &str = "counters";

/// Counter document for product numbers.
const PRODUCT_COUNTER: &str = "products";

/// Product catalog stored in Firestore.
#[derive(Clone)]
pub struct FirestoreCatalog {
    client: FirestoreClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl FirestoreCatalog {
    /// Create a catalog whose reads stay cached for `ttl`.
    #[must_use]
    pub fn new(client: FirestoreClient, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self { client, cache }
    }

    fn to_product(document: &Document) -> Product {
        normalize_product(RawProduct::from(document.to_json()), document.id())
    }
}

#[async_trait]
impl ProductRepository for FirestoreCatalog {
    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> Result<Option<Product>, CatalogError> {
        // Document ids never contain a slash; such paths can only be slugs.
        if id.is_empty() || id.contains('/') {
            return Ok(None);
        }

        let key = CacheKey::Product(id.to_owned());
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let Some(document) = self.client.get_document(PRODUCTS, id).await? else {
            return Ok(None);
        };
        let product = Self::to_product(&document);

        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(Some(product))
    }

    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError> {
        let key = CacheKey::Slug(slug.to_owned());
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            debug!("Cache hit for slug");
            return Ok(Some(*product));
        }

        let documents = self
            .client
            .query_equal(PRODUCTS, "meta.url", &json!(slug), Some(1))
            .await?;
        let Some(product) = documents.first().map(Self::to_product) else {
            return Ok(None);
        };

        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(Some(product))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.cache.get(&CacheKey::Products).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .client
            .list_documents(PRODUCTS)
            .await?
            .iter()
            .map(Self::to_product)
            .collect();

        self.cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    #[instrument(skip(self, document), fields(number = document.id))]
    async fn insert(&self, document: ProductDocument) -> Result<Product, CatalogError> {
        let fields = document_fields(&document)?;
        let created = self.client.create_document(PRODUCTS, fields).await?;
        self.cache.invalidate_all();
        Ok(Self::to_product(&created))
    }

    async fn counter(&self) -> Result<Option<u64>, CatalogError> {
        let document = self.client.get_document(COUNTERS, PRODUCT_COUNTER).await?;
        Ok(document.map(|doc| counter_value(&doc.fields)))
    }

    async fn set_counter(&self, next: u64) -> Result<(), CatalogError> {
        let mut fields = value::Fields::new();
        fields.insert(
            "value".to_owned(),
            value::Value::IntegerValue(next.to_string()),
        );
        self.client
            .set_document(COUNTERS, PRODUCT_COUNTER, fields)
            .await?;
        Ok(())
    }
}

/// Encode a new product for Firestore: prices as numbers, `createdAt` as a
/// timestamp.
fn document_fields(document: &ProductDocument) -> Result<value::Fields, FirestoreError> {
    let mut fields = match serde_json::to_value(document)? {
        serde_json::Value::Object(map) => value::json_to_fields(&map),
        _ => value::Fields::new(),
    };
    fields.insert(
        "createdAt".to_owned(),
        value::Value::timestamp(document.created_at),
    );
    Ok(fields)
}

/// Read the counter document's `value`. An unreadable value counts as 0.
fn counter_value(fields: &value::Fields) -> u64 {
    let current = fields
        .get("value")
        .and_then(value::Value::as_i64)
        .and_then(|n| u64::try_from(n).ok());
    if current.is_none() {
        warn!(value = ?fields.get("value"), "Product counter value unreadable, treating as 0");
    }
    current.unwrap_or(0)
}
