//! Cart route handlers.
//!
//! The cart lives in the visitor's session under `shopping_cart`, as the same
//! JSON array a browser would keep in local storage. Each handler loads it,
//! applies one change, and flushes it back.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::storage::keys;
use emporium_core::{CartItem, CartStore, KeyValueStore, Price, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::SessionStorage;
use crate::state::AppState;

/// Cart contents with derived totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total: Price,
    pub display_total: String,
    pub count: u64,
}

impl CartView {
    /// Snapshot a cart.
    #[must_use]
    pub fn from_cart<S: KeyValueStore>(cart: &CartStore<S>) -> Self {
        let total = cart.cart_total();
        Self {
            items: cart.items().to_vec(),
            total,
            display_total: total.display(),
            count: cart.cart_items_count(),
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartForm {
    pub product_id: String,
    /// Zero or below removes the item.
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session.
pub(crate) async fn load_cart(session: &Session) -> Result<CartStore<SessionStorage>> {
    let storage = SessionStorage::load(session, &[keys::CART]).await?;
    Ok(CartStore::load(storage))
}

/// Flush the cart back to the session and return its view.
async fn save_cart(session: &Session, cart: CartStore<SessionStorage>) -> Result<CartView> {
    let view = CartView::from_cart(&cart);
    cart.into_storage().flush(session).await?;
    Ok(view)
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from_cart(&cart)))
}

/// Add a product to the cart, or bump its quantity if already there.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<AddToCartForm>,
) -> Result<Json<CartView>> {
    let quantity = form.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest("Quantity must be at least 1".to_owned()));
    }

    let product = state
        .catalog()
        .get_by_id(&form.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let quantity_label = quantity.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[
            ("product_id", product.id.as_str()),
            ("quantity", quantity_label.as_str()),
        ]),
    );

    let mut cart = load_cart(&session).await?;
    cart.add_quantity(product, quantity);
    save_cart(&session, cart).await.map(Json)
}

/// Set an item's quantity.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(form): Json<UpdateCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(&ProductId::new(form.product_id), form.quantity);
    save_cart(&session, cart).await.map(Json)
}

/// Remove an item.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(form): Json<RemoveFromCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.remove_from_cart(&ProductId::new(form.product_id));
    save_cart(&session, cart).await.map(Json)
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear_cart();
    save_cart(&session, cart).await.map(Json)
}
