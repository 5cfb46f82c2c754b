//! Checkout route handlers.
//!
//! Checkout shows the order summary and the saved shipping address. Placing
//! the order itself is out of scope; `canPlaceOrder` only reports whether it
//! would be allowed.

use axum::{Json, extract::State};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::checkout::OrderSummary;
use emporium_core::storage::keys;
use emporium_core::{Address, CartItem, CartStore, UserId};

use crate::error::Result;
use crate::middleware::{OptionalAuth, SessionStorage};
use crate::models::CurrentUser;
use crate::services::address::{AddressSaved, GUEST_USER, load_saved_address, save_address};
use crate::state::AppState;

/// Everything the checkout page shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub items: Vec<CartItem>,
    pub summary: OrderSummary,
    pub shipping_label: String,
    pub address: Option<Address>,
}

/// Response after saving an address.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSavedView {
    pub saved_to: AddressSaved,
    pub address: Address,
}

/// Addresses are filed under the signed-in user, or the shared guest owner.
fn address_owner(user: Option<&CurrentUser>) -> UserId {
    user.map_or_else(|| UserId::new(GUEST_USER), |user| user.id.clone())
}

/// Show the order summary and saved address.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Json<CheckoutView>> {
    let storage = SessionStorage::load(&session, &[keys::CART, keys::SHIPPING_ADDRESS]).await?;
    let cart = CartStore::load(storage);

    let owner = address_owner(user.as_ref());
    let address = load_saved_address(state.addresses(), cart.storage(), &owner)
        .await
        .into_option();

    let summary = OrderSummary::new(&cart, address.is_some(), state.config().fees);

    Ok(Json(CheckoutView {
        items: cart.items().to_vec(),
        shipping_label: summary.shipping_label(),
        summary,
        address,
    }))
}

/// Validate and save the shipping address.
///
/// Responds 422 with the first missing field when the address is incomplete.
/// A remote failure still succeeds with `savedTo: "locally"`.
#[instrument(skip(state, session, user, address))]
pub async fn save(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Json(mut address): Json<Address>,
) -> Result<Json<AddressSavedView>> {
    if let Some(user) = &user {
        address.user_id = Some(user.id.clone());
    }
    let owner = address_owner(user.as_ref());

    let mut storage = SessionStorage::load(&session, &[keys::SHIPPING_ADDRESS]).await?;
    let saved_to = save_address(state.addresses(), &mut storage, &owner, &address).await?;
    storage.flush(&session).await?;

    Ok(Json(AddressSavedView { saved_to, address }))
}
