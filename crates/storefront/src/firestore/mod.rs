//! Firestore REST client.
//!
//! # Architecture
//!
//! - Plain `reqwest` calls against the Firestore v1 REST API, authorized with
//!   the project's web API key
//! - Documents arrive as typed values (see [`value`]) and are decoded into
//!   plain JSON before anything else looks at them
//! - No caching here; the catalog layers a `moka` cache on top
//!
//! # Example
//!
//! ```rust,ignore
//! use emporium_storefront::firestore::FirestoreClient;
//!
//! let client = FirestoreClient::new(&config.firebase);
//!
//! // Fetch one product by document id
//! let doc = client.get_document("products", "abc123").await?;
//!
//! // Find products by slug
//! let docs = client
//!     .query_equal("products", "meta.url", &json!("red-shoes"), Some(1))
//!     .await?;
//! ```

mod client;
pub mod value;

pub use client::FirestoreClient;
pub use value::{Fields, Value};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to Firestore.
#[derive(Debug, Error)]
pub enum FirestoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Firestore answered with a non-success status.
    #[error("Firestore returned {status}: {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Rate limited by Firestore.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// A stored document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name, ending in the document id.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

impl Document {
    /// The document id: the last segment of the resource name.
    #[must_use]
    pub fn id(&self) -> &str {
        self.name
            .rsplit_once('/')
            .map_or(self.name.as_str(), |(_, id)| id)
    }

    /// The fields decoded into a plain JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        value::fields_to_json(&self.fields)
    }
}

/// Error body returned by Google APIs.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// Pull the human-readable message out of a Google API error body, falling
/// back to the (truncated) raw text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| body.chars().take(200).collect(),
        |parsed| parsed.error.message,
    )
}
