//! Product administration.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use emporium_core::Product;
use emporium_core::form::ProductForm;

use crate::catalog::{peek_next_product_id, submit_product};
use crate::error::Result;
use crate::state::AppState;

/// Validate a product form and add it to the catalog.
///
/// Responds 201 with the stored product, or 422 naming the first problem with
/// the form.
#[instrument(skip(state, form), fields(name = %form.name))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = submit_product(state.catalog(), &form).await?;
    tracing::info!(product_id = %product.id, slug = ?product.meta.url, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// The id the next submitted product will get.
#[instrument(skip(state))]
pub async fn next_id(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let next = peek_next_product_id(state.catalog()).await?;
    Ok(Json(serde_json::json!({ "nextId": next })))
}
