//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions, and bridges the session
//! to the synchronous [`KeyValueStore`] the cart and address code persist to.
//! A visitor's session is their "local storage".

use std::collections::{HashMap, HashSet};

use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use emporium_core::storage::StorageError;
use emporium_core::KeyValueStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "emporium_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

// =============================================================================
// SessionStorage
// =============================================================================

/// A snapshot of selected session keys, usable as a [`KeyValueStore`].
///
/// Load it at the start of a request, hand it to a `CartStore` (or the address
/// service), then [`flush`](Self::flush) it to write changed keys back.
#[derive(Debug, Default)]
pub struct SessionStorage {
    values: HashMap<String, String>,
    dirty: HashSet<String>,
}

impl SessionStorage {
    /// Read `keys` from the session. Values that are not strings are treated
    /// as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load(
        session: &Session,
        keys: &[&str],
    ) -> Result<Self, tower_sessions::session::Error> {
        let mut values = HashMap::new();
        for key in keys {
            let value = session
                .get_value(key)
                .await?
                .and_then(|value| value.as_str().map(str::to_owned));
            if let Some(value) = value {
                values.insert((*key).to_owned(), value);
            }
        }

        Ok(Self {
            values,
            dirty: HashSet::new(),
        })
    }

    /// Write changed keys back to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn flush(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        let Self { values, dirty } = self;
        for key in dirty {
            match values.get(&key) {
                Some(value) => session.insert(&key, value).await?,
                None => {
                    session.remove_value(&key).await?;
                }
            }
        }
        Ok(())
    }

    /// Whether anything changed since loading.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }
}

impl KeyValueStore for SessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.values.insert(key.to_owned(), value);
        self.dirty.insert(key.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        self.dirty.insert(key.to_owned());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use emporium_core::storage::keys;
    use emporium_core::{CartStore, Product, ProductId, RawProduct, normalize_product};
    use serde_json::json;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn product(id: &str) -> Product {
        normalize_product(RawProduct::from(json!({ "name": id, "price": 2.5 })), id)
    }

    #[tokio::test]
    async fn test_cart_survives_flush_and_reload() {
        let session = session();

        let storage = SessionStorage::load(&session, &[keys::CART]).await.unwrap();
        let mut cart = CartStore::load(storage);
        cart.add_quantity(product("a"), 2);
        cart.into_storage().flush(&session).await.unwrap();

        let storage = SessionStorage::load(&session, &[keys::CART]).await.unwrap();
        let cart = CartStore::load(storage);
        assert_eq!(cart.get(&ProductId::new("a")).unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_remove_is_flushed() {
        let session = session();
        session.insert(keys::CART, "[]").await.unwrap();

        let mut storage = SessionStorage::load(&session, &[keys::CART]).await.unwrap();
        storage.remove(keys::CART).unwrap();
        assert!(storage.is_dirty());
        storage.flush(&session).await.unwrap();

        assert_eq!(session.get_value(keys::CART).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_string_values_are_ignored() {
        let session = session();
        session.insert(keys::CART, 42).await.unwrap();

        let storage = SessionStorage::load(&session, &[keys::CART]).await.unwrap();
        assert_eq!(storage.get(keys::CART).unwrap(), None);
        assert!(!storage.is_dirty());
    }
}
