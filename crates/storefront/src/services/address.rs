//! Saved shipping addresses.
//!
//! Addresses live in two tiers: the remote `addresses` collection and the
//! visitor's local storage under `shippingAddress`. Reads prefer the remote
//! tier and fall back to local; writes go to both, and a remote failure still
//! leaves the address saved locally.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::instrument;

use emporium_core::storage::{keys, load_json, save_json};
use emporium_core::{Address, AddressError, Fetched, KeyValueStore, UserId};

use crate::firestore::{FirestoreClient, FirestoreError, value};

/// Collection holding saved addresses.
pub const ADDRESSES: &str = "addresses";

/// Owner recorded for addresses saved without a signed-in account.
pub const GUEST_USER: &str = "current-user";

/// Remote address storage.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// The first saved address owned by `user`.
    async fn find_for_user(&self, user: &UserId) -> Result<Option<Address>, FirestoreError>;

    /// Append a saved address.
    async fn insert(&self, address: &Address) -> Result<(), FirestoreError>;
}

#[async_trait]
impl AddressStore for FirestoreClient {
    async fn find_for_user(&self, user: &UserId) -> Result<Option<Address>, FirestoreError> {
        let documents = self
            .query_equal(ADDRESSES, "userId", &json!(user.as_str()), Some(1))
            .await?;
        documents
            .first()
            .map(|doc| serde_json::from_value(doc.to_json()))
            .transpose()
            .map_err(FirestoreError::from)
    }

    async fn insert(&self, address: &Address) -> Result<(), FirestoreError> {
        let fields = match serde_json::to_value(address)? {
            serde_json::Value::Object(map) => value::json_to_fields(&map),
            _ => value::Fields::new(),
        };
        self.create_document(ADDRESSES, fields).await?;
        Ok(())
    }
}

/// Where a saved address ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressSaved {
    /// Stored remotely and locally.
    Remotely,
    /// The remote write failed; only the local copy exists.
    Locally,
}

/// Load the address to show at checkout: the remote copy for `user` if there
/// is one, otherwise whatever is saved locally.
#[instrument(skip(remote, local))]
pub async fn load_saved_address(
    remote: &dyn AddressStore,
    local: &impl KeyValueStore,
    user: &UserId,
) -> Fetched<Address> {
    let fetched = Fetched::from(remote.find_for_user(user).await);
    if let Fetched::Error(message) = &fetched {
        tracing::warn!(error = %message, "Failed to load address remotely, using local copy");
    }
    fetched.or_else(|| {
        load_json::<Address>(local, keys::SHIPPING_ADDRESS).map_or(Fetched::Empty, Fetched::Ok)
    })
}

/// Validate and save an address for `user`.
///
/// The address is written to local storage as entered, and a stamped copy
/// (owner, time, default flag) is appended remotely.
///
/// # Errors
///
/// Returns `AddressError` if a required field is blank or the email does not
/// parse. Nothing is written in that case.
#[instrument(skip(remote, local, address))]
pub async fn save_address(
    remote: &dyn AddressStore,
    local: &mut impl KeyValueStore,
    user: &UserId,
    address: &Address,
) -> Result<AddressSaved, AddressError> {
    address.validate()?;

    if let Err(e) = save_json(local, keys::SHIPPING_ADDRESS, address) {
        tracing::error!(error = %e, "Failed to save address to local storage");
    }

    match remote.insert(&address.stamped(user, Utc::now())).await {
        Ok(()) => {
            tracing::info!("Address saved");
            Ok(AddressSaved::Remotely)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to save address remotely, kept local copy");
            Ok(AddressSaved::Locally)
        }
    }
}

// =============================================================================
// InMemoryAddresses
// =============================================================================

/// Address store held in memory, for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryAddresses {
    addresses: RwLock<Vec<Address>>,
    unavailable: bool,
}

impl InMemoryAddresses {
    /// An empty, working store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails, standing in for an unreachable backend.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            addresses: RwLock::default(),
            unavailable: true,
        }
    }

    /// Everything saved so far.
    pub async fn saved(&self) -> Vec<Address> {
        self.addresses.read().await.clone()
    }

    fn check(&self) -> Result<(), FirestoreError> {
        if self.unavailable {
            return Err(FirestoreError::Status {
                status: 503,
                message: "address store unavailable".to_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AddressStore for InMemoryAddresses {
    async fn find_for_user(&self, user: &UserId) -> Result<Option<Address>, FirestoreError> {
        self.check()?;
        Ok(self
            .addresses
            .read()
            .await
            .iter()
            .find(|address| address.user_id.as_ref() == Some(user))
            .cloned())
    }

    async fn insert(&self, address: &Address) -> Result<(), FirestoreError> {
        self.check()?;
        self.addresses.write().await.push(address.clone());
        Ok(())
    }
}
