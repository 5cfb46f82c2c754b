//! HTTP route handlers for storefront.
//!
//! All responses are JSON.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing with featured/discounted shelves
//! GET  /products/{*slug}       - Product detail by id or slug (slug may contain '/')
//!
//! # Cart (session-backed)
//! GET  /cart                   - Cart contents, total and count
//! POST /cart/add               - Add a product (quantity defaults to 1)
//! POST /cart/update            - Set quantity (<= 0 removes)
//! POST /cart/remove            - Remove an item
//! POST /cart/clear             - Empty the cart
//!
//! # Checkout
//! GET  /checkout               - Order summary and saved address
//! POST /checkout/address       - Save the shipping address
//!
//! # Auth
//! POST /auth/login             - Email/password login
//! POST /auth/register          - Create account
//! POST /auth/logout            - Logout
//!
//! # Admin
//! POST /admin/products         - Submit a product form
//! GET  /admin/products/next-id - Number the next product will get
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{*slug}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/address", post(checkout::save))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(admin::create_product))
        .route("/products/next-id", get(admin::next_id))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
