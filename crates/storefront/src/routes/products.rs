//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use emporium_core::{LookupState, Price, Product, ProductImage};

use crate::catalog::{Listing, resolve_product};
use crate::error::Result;
use crate::state::AppState;

/// Product detail as shown on its page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView<'a> {
    #[serde(flatten)]
    pub product: &'a Product,
    /// Images in display order, or the placeholder.
    pub gallery: Vec<ProductImage>,
    pub savings: Price,
    pub display_price: String,
}

impl<'a> From<&'a Product> for ProductView<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            product,
            gallery: product.gallery(),
            savings: product.savings(),
            display_price: product.price.display(),
        }
    }
}

/// Product listing with the featured and discounted shelves.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Listing>> {
    let products = state.catalog().list().await?;
    Ok(Json(Listing::from_products(products)))
}

/// Product detail by document id or slug.
///
/// Responds 200 with `{"status": "found", "product": ...}`, 404 with
/// `{"status": "not_found"}`, or 502 with `{"status": "failed"}`.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match resolve_product(state.catalog(), &slug).await {
        LookupState::Found(product) => (
            StatusCode::OK,
            Json(json!({
                "status": "found",
                "product": ProductView::from(product.as_ref()),
            })),
        )
            .into_response(),
        outcome @ LookupState::NotFound => (StatusCode::NOT_FOUND, Json(outcome)).into_response(),
        outcome @ (LookupState::Failed | LookupState::Loading) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "status": outcome, "retry": true })),
        )
            .into_response(),
    }
}
