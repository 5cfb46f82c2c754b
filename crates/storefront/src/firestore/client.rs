//! Firestore REST client implementation.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use super::value::Value;
use super::{Document, Fields, FirestoreError, error_message};
use crate::config::FirebaseConfig;

/// Documents requested per page when listing a collection.
const PAGE_SIZE: u32 = 300;

// =============================================================================
// FirestoreClient
// =============================================================================

/// Client for the Firestore REST API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    /// `.../projects/{project}/databases/{database}/documents`
    documents_url: String,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryResponse {
    document: Option<Document>,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        let documents_url = format!(
            "{}/projects/{}/databases/{}/documents",
            config.firestore_endpoint.trim_end_matches('/'),
            config.project_id,
            config.database
        );

        Self {
            inner: Arc::new(FirestoreClientInner {
                client: reqwest::Client::new(),
                documents_url,
                api_key: config.api_key.clone(),
            }),
        }
    }

    /// Build `{documents_url}/{segments...}?key=...`, percent-encoding each
    /// segment.
    fn document_url(&self, segments: &[&str]) -> Result<Url, FirestoreError> {
        let mut url = Url::parse(&self.inner.documents_url)?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .extend(segments);
        Ok(self.with_key(url))
    }

    fn with_key(&self, mut url: Url) -> Url {
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());
        url
    }

    /// Send a request and return the response body.
    ///
    /// A 404 is reported as `Ok(None)` so callers can treat a missing
    /// document as absence rather than failure.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Option<String>, FirestoreError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(FirestoreError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Firestore returned non-success status"
            );
            return Err(FirestoreError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(Some(body))
    }

    /// Send a request whose target must exist.
    async fn send_expecting(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<String, FirestoreError> {
        self.send(request).await?.ok_or(FirestoreError::Status {
            status: 404,
            message: "Not found".to_owned(),
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get one document, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, FirestoreError> {
        let url = self.document_url(&[collection, id])?;
        let Some(body) = self.send(self.inner.client.get(url)).await? else {
            debug!("Document not found");
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&body)?))
    }

    /// List every document in a collection, following page tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    #[instrument(skip(self))]
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, FirestoreError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.document_url(&[collection])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", &PAGE_SIZE.to_string());
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let Some(body) = self.send(self.inner.client.get(url)).await? else {
                break;
            };
            let page: ListResponse = serde_json::from_str(&body)?;
            documents.extend(page.documents);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = documents.len(), "Listed documents");
        Ok(documents)
    }

    /// Find documents whose `field_path` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query request fails.
    #[instrument(skip(self, value))]
    pub async fn query_equal(
        &self,
        collection: &str,
        field_path: &str,
        value: &serde_json::Value,
        limit: Option<u32>,
    ) -> Result<Vec<Document>, FirestoreError> {
        let url = self.with_key(Url::parse(&format!(
            "{}:runQuery",
            self.inner.documents_url
        ))?);

        let mut structured_query = json!({
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field_path },
                    "op": "EQUAL",
                    "value": Value::from_json(value),
                }
            }
        });
        if let Some(limit) = limit {
            structured_query["limit"] = json!(limit);
        }

        let body = self
            .send_expecting(
                self.inner
                    .client
                    .post(url)
                    .json(&json!({ "structuredQuery": structured_query })),
            )
            .await?;

        // Each element carries at most one document; a lone element without
        // one means no match.
        let rows: Vec<RunQueryResponse> = serde_json::from_str(&body)?;
        Ok(rows.into_iter().filter_map(|row| row.document).collect())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create a document with a generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    #[instrument(skip(self, fields))]
    pub async fn create_document(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<Document, FirestoreError> {
        let url = self.document_url(&[collection])?;
        let body = self
            .send_expecting(self.inner.client.post(url).json(&json!({ "fields": fields })))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Create or replace the document at `collection/id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    #[instrument(skip(self, fields))]
    pub async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, FirestoreError> {
        let url = self.document_url(&[collection, id])?;
        let body = self
            .send_expecting(self.inner.client.patch(url).json(&json!({ "fields": fields })))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl std::fmt::Debug for FirestoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreClient")
            .field("documents_url", &self.inner.documents_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> FirestoreClient {
        FirestoreClient::new(&FirebaseConfig {
            project_id: "emporium-test".to_owned(),
            api_key: SecretString::from("AIzaSyD-k3y"),
            database: "(default)".to_owned(),
            firestore_endpoint: "https://firestore.googleapis.com/v1/".to_owned(),
            auth_endpoint: "https://identitytoolkit.googleapis.com/v1".to_owned(),
        })
    }

    #[test]
    fn test_document_url_encodes_segments() {
        let url = client().document_url(&["products", "red shoes"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/emporium-test/databases/(default)/documents/products/red%20shoes?key=AIzaSyD-k3y"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("AIzaSyD-k3y"));
    }

    #[test]
    fn test_run_query_rows_without_documents() {
        let rows: Vec<RunQueryResponse> =
            serde_json::from_str(r#"[{"readTime":"2024-03-01T10:00:00Z"}]"#).unwrap();
        assert!(rows.into_iter().all(|row| row.document.is_none()));
    }
}
