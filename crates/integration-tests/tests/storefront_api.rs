//! Storefront API tests, driven through the full router.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{Value, json};

use emporium_core::{Product, RawProduct, normalize_product};
use emporium_integration_tests::TestContext;
use emporium_storefront::catalog::InMemoryCatalog;
use emporium_storefront::services::address::InMemoryAddresses;

fn product(id: &str, value: Value) -> Product {
    normalize_product(RawProduct::from(value), id)
}

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::with_products(vec![
        product(
            "doc-1",
            json!({
                "name": "Red Shoes",
                "price": 10,
                "images": [{ "url": "https://cdn.example/red.png", "priority": 1 }],
                "meta": { "url": "red-shoes" }
            }),
        ),
        product(
            "doc-2",
            json!({
                "name": "Blue Hat",
                "price": "5.5",
                "previousPrice": 8,
                "discountPercent": 30,
                "meta": { "url": "hats/blue" }
            }),
        ),
        product("doc-3", json!({ "name": "Mystery Box" })),
    ])
}

fn address() -> Value {
    json!({
        "fullName": "Ada Lovelace",
        "phone": "555-0100",
        "email": "ada@example.com",
        "street": "12 Analytical Way",
        "city": "London",
        "state": "LDN",
        "zipCode": "N1 9GU",
        "country": "UK"
    })
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_health() {
    let mut ctx = TestContext::with_catalog(InMemoryCatalog::new());
    assert_eq!(ctx.get("/health").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_listing_has_shelves() {
    let mut ctx = TestContext::with_catalog(catalog());

    let resp = ctx.get("/products").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["all"].as_array().unwrap().len(), 3);

    let featured = resp.body["featured"].as_array().unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0]["name"], "Red Shoes");

    let discounted = resp.body["discounted"].as_array().unwrap();
    assert_eq!(discounted.len(), 1);
    assert_eq!(discounted[0]["name"], "Blue Hat");
}

#[tokio::test]
async fn test_product_by_slug_and_by_id() {
    let mut ctx = TestContext::with_catalog(catalog());

    let resp = ctx.get("/products/red-shoes").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "found");
    assert_eq!(resp.body["product"]["id"], "doc-1");
    assert_eq!(resp.body["product"]["displayPrice"], "$10.00");

    let resp = ctx.get("/products/doc-3").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["product"]["name"], "Mystery Box");
    // No images: the gallery falls back to the placeholder
    assert_eq!(resp.body["product"]["gallery"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_product_slug_with_slashes() {
    let mut ctx = TestContext::with_catalog(catalog());

    let resp = ctx.get("/products/hats/blue").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["product"]["name"], "Blue Hat");
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let mut ctx = TestContext::with_catalog(catalog());

    let resp = ctx.get("/products/green-gloves").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["status"], "not_found");
}

#[tokio::test]
async fn test_unavailable_catalog_asks_for_retry() {
    let mut ctx = TestContext::with_catalog(InMemoryCatalog::unavailable());

    let resp = ctx.get("/products").await;
    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert_eq!(resp.body["retry"], true);
    assert_eq!(resp.body["error"], "Failed to load products");

    let resp = ctx.get("/products/red-shoes").await;
    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert_eq!(resp.body["status"], "failed");
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_cart_starts_empty() {
    let mut ctx = TestContext::with_catalog(catalog());

    let resp = ctx.get("/cart").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["count"], 0);
    assert_eq!(resp.body["displayTotal"], "$0.00");
}

#[tokio::test]
async fn test_cart_flow_persists_across_requests() {
    let mut ctx = TestContext::with_catalog(catalog());

    let resp = ctx
        .post("/cart/add", &json!({ "productId": "doc-1", "quantity": 2 }))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["count"], 2);

    ctx.post("/cart/add", &json!({ "productId": "doc-2" })).await;
    ctx.post("/cart/add", &json!({ "productId": "doc-1" })).await;

    let resp = ctx.get("/cart").await;
    assert_eq!(resp.body["items"].as_array().unwrap().len(), 2);
    assert_eq!(resp.body["count"], 4);
    assert_eq!(resp.body["displayTotal"], "$35.50");

    let resp = ctx
        .post("/cart/update", &json!({ "productId": "doc-2", "quantity": 0 }))
        .await;
    assert_eq!(resp.body["count"], 3);
    assert_eq!(resp.body["items"].as_array().unwrap().len(), 1);

    let resp = ctx
        .post("/cart/remove", &json!({ "productId": "doc-1" }))
        .await;
    assert_eq!(resp.body["count"], 0);
}

#[tokio::test]
async fn test_cart_clear() {
    let mut ctx = TestContext::with_catalog(catalog());

    ctx.post("/cart/add", &json!({ "productId": "doc-1" })).await;
    let resp = ctx.post("/cart/clear", &json!({})).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body["items"].as_array().unwrap().is_empty());

    assert_eq!(ctx.get("/cart").await.body["count"], 0);
}

#[tokio::test]
async fn test_adding_unknown_product_is_rejected() {
    let mut ctx = TestContext::with_catalog(catalog());

    let resp = ctx
        .post("/cart/add", &json!({ "productId": "doc-99" }))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = ctx
        .post("/cart/add", &json!({ "productId": "doc-1", "quantity": 0 }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_summary_without_address() {
    let mut ctx = TestContext::with_catalog(catalog());
    ctx.post("/cart/add", &json!({ "productId": "doc-1" })).await;

    let resp = ctx.get("/checkout").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["shippingLabel"], "FREE");
    assert_eq!(resp.body["summary"]["itemCount"], 1);
    assert_eq!(resp.body["summary"]["canPlaceOrder"], false);
    assert!(resp.body["address"].is_null());
}

#[tokio::test]
async fn test_incomplete_address_is_unprocessable() {
    let mut ctx = TestContext::with_catalog(catalog());

    let mut incomplete = address();
    incomplete["city"] = json!("  ");

    let resp = ctx.post("/checkout/address", &incomplete).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.body["error"], "city is required");
}

#[tokio::test]
async fn test_saved_address_enables_order() {
    let addresses = Arc::new(InMemoryAddresses::new());
    let mut ctx = TestContext::new(Arc::new(catalog()), addresses.clone());
    ctx.post("/cart/add", &json!({ "productId": "doc-1" })).await;

    let resp = ctx.post("/checkout/address", &address()).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["savedTo"], "remotely");

    let saved = addresses.saved().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].user_id.as_ref().unwrap().as_str(), "current-user");
    assert_eq!(saved[0].is_guest, Some(true));

    let resp = ctx.get("/checkout").await;
    assert_eq!(resp.body["address"]["fullName"], "Ada Lovelace");
    assert_eq!(resp.body["summary"]["canPlaceOrder"], true);
}

#[tokio::test]
async fn test_address_falls_back_to_session_when_remote_is_down() {
    let mut ctx = TestContext::new(
        Arc::new(catalog()),
        Arc::new(InMemoryAddresses::unavailable()),
    );

    let resp = ctx.post("/checkout/address", &address()).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["savedTo"], "locally");

    let resp = ctx.get("/checkout").await;
    assert_eq!(resp.body["address"]["city"], "London");
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_submitted_product_is_listed_and_findable() {
    let mut ctx = TestContext::with_catalog(InMemoryCatalog::new());

    let form = json!({
        "name": "Green Gloves",
        "introductionHtml": "<p>Gloves</p>",
        "descriptionHtml": "<p>Very green</p>",
        "price": "7.25",
        "category": "Accessories",
        "meta": { "url": "green-gloves" }
    });

    let resp = ctx.get("/admin/products/next-id").await;
    assert_eq!(resp.body["nextId"], 1);

    let resp = ctx.post("/admin/products", &form).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["name"], "Green Gloves");

    let resp = ctx.get("/products/green-gloves").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["product"]["displayPrice"], "$7.25");

    let resp = ctx.get("/admin/products/next-id").await;
    assert_eq!(resp.body["nextId"], 2);
}

#[tokio::test]
async fn test_invalid_product_form_is_unprocessable() {
    let mut ctx = TestContext::with_catalog(InMemoryCatalog::new());

    let form = json!({
        "name": "Free Lunch",
        "introductionHtml": "<p>Lunch</p>",
        "descriptionHtml": "<p>Free</p>",
        "price": "0"
    });

    let resp = ctx.post("/admin/products", &form).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.body["error"], "Invalid price");

    let resp = ctx.get("/products").await;
    assert!(resp.body["all"].as_array().unwrap().is_empty());
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_login_rejects_bad_input_before_calling_firebase() {
    let mut ctx = TestContext::with_catalog(InMemoryCatalog::new());

    let resp = ctx
        .post(
            "/auth/login",
            &json!({ "email": "not-an-email", "password": "hunter22" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = ctx
        .post(
            "/auth/login",
            &json!({ "email": "ada@example.com", "password": "" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["error"], "MISSING_PASSWORD");
}

#[tokio::test]
async fn test_register_rejects_mismatched_passwords() {
    let mut ctx = TestContext::with_catalog(InMemoryCatalog::new());

    let resp = ctx
        .post(
            "/auth/register",
            &json!({
                "email": "ada@example.com",
                "password": "hunter22",
                "passwordConfirm": "hunter23"
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "Passwords do not match");
}

#[tokio::test]
async fn test_logout_without_login() {
    let mut ctx = TestContext::with_catalog(InMemoryCatalog::new());

    let resp = ctx.post("/auth/logout", &json!({})).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);
}
