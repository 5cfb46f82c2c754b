//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{FirestoreCatalog, ProductRepository};
use crate::config::StorefrontConfig;
use crate::firestore::FirestoreClient;
use crate::services::address::AddressStore;
use crate::services::auth::AuthService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<dyn ProductRepository>,
    addresses: Arc<dyn AddressStore>,
    auth: AuthService,
}

impl AppState {
    /// Create application state backed by Firestore and Firebase Auth.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let firestore = FirestoreClient::new(&config.firebase);
        let catalog = FirestoreCatalog::new(firestore.clone(), config.catalog_cache_ttl);

        Self::with_backends(config, Arc::new(catalog), Arc::new(firestore))
    }

    /// Create application state with explicit catalog and address backends.
    #[must_use]
    pub fn with_backends(
        config: StorefrontConfig,
        catalog: Arc<dyn ProductRepository>,
        addresses: Arc<dyn AddressStore>,
    ) -> Self {
        let auth = AuthService::new(&config.firebase);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                addresses,
                auth,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &dyn ProductRepository {
        self.inner.catalog.as_ref()
    }

    /// Get the remote address store.
    #[must_use]
    pub fn addresses(&self) -> &dyn AddressStore {
        self.inner.addresses.as_ref()
    }

    /// Get the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }
}
