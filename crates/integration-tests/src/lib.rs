//! In-process HTTP tests for the Emporium storefront.
//!
//! Requests go straight into the storefront router with
//! `tower::ServiceExt::oneshot`; no server, Firestore or Firebase Auth is
//! needed. The catalog and address store are the in-memory backends.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p emporium-integration-tests
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use emporium_core::checkout::Fees;
use emporium_storefront::catalog::{InMemoryCatalog, ProductRepository};
use emporium_storefront::config::{FirebaseConfig, StorefrontConfig};
use emporium_storefront::services::address::{AddressStore, InMemoryAddresses};
use emporium_storefront::state::AppState;

/// Largest response body the helpers will read.
const BODY_LIMIT: usize = 1024 * 1024;

/// Configuration pointing at unreachable Firebase endpoints.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_owned(),
        firebase: FirebaseConfig {
            project_id: "emporium-test".to_owned(),
            api_key: SecretString::from("AIzaSyB7q-9xZ2mLk4Rt8VwPn3Hc1Jd6Fs0Ge5Ua"),
            database: "(default)".to_owned(),
            firestore_endpoint: "http://127.0.0.1:9/v1".to_owned(),
            auth_endpoint: "http://127.0.0.1:9/v1".to_owned(),
        },
        fees: Fees::default(),
        catalog_cache_ttl: Duration::from_secs(60),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// JSON body, or `Value::Null` when the body is empty or not JSON.
    pub body: Value,
}

/// One visitor talking to one storefront.
///
/// The session cookie from each response is sent with the next request, the
/// way a browser would.
pub struct TestContext {
    app: Router,
    cookie: Option<String>,
}

impl TestContext {
    /// A storefront backed by the given catalog and address store.
    #[must_use]
    pub fn new(catalog: Arc<dyn ProductRepository>, addresses: Arc<dyn AddressStore>) -> Self {
        let state = AppState::with_backends(test_config(), catalog, addresses);
        Self {
            app: emporium_storefront::app(state),
            cookie: None,
        }
    }

    /// A storefront with the given products and a working address store.
    #[must_use]
    pub fn with_catalog(catalog: InMemoryCatalog) -> Self {
        Self::new(Arc::new(catalog), Arc::new(InMemoryAddresses::new()))
    }

    /// Send a GET request.
    ///
    /// # Panics
    ///
    /// Panics if the router fails to respond.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    /// Send a POST request with a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the router fails to respond.
    pub async fn post(&mut self, path: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, path, Some(body)).await
    }

    #[allow(clippy::expect_used)]
    async fn send(&mut self, method: Method, path: &str, body: Option<&Value>) -> TestResponse {
        let mut request = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_owned());
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("readable body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}
