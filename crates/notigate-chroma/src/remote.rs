// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a Chroma-style vector store service.
//!
//! The service embeds query text server-side and exposes two calls per
//! collection: `query` (nearest neighbours with optional metadata filters)
//! and `get` (full listing). Responses use Chroma's columnar shape --
//! parallel arrays of ids/documents/metadatas/distances.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use notigate_config::model::StoreConfig;
use notigate_core::NotigateError;
use notigate_core::traits::VectorStore;
use notigate_core::types::{ScoredDocument, StoredDocument};

/// HTTP client for the remote vector store.
#[derive(Debug, Clone)]
pub struct ChromaStore {
    client: reqwest::Client,
    base_url: String,
    max_attempts: u32,
}

/// Query request body.
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query_text: &'a str,
    n_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    r#where: Option<&'a HashMap<String, String>>,
}

/// Columnar query response: one inner list per query text (we send one).
#[derive(Debug, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    documents: Vec<Vec<String>>,
    #[serde(default)]
    metadatas: Vec<Vec<Option<Map<String, Value>>>>,
    distances: Vec<Vec<f32>>,
}

/// Columnar listing response.
#[derive(Debug, Deserialize)]
struct GetResponse {
    ids: Vec<String>,
    documents: Vec<String>,
    #[serde(default)]
    metadatas: Vec<Option<Map<String, Value>>>,
}

impl ChromaStore {
    /// Creates a new remote store client.
    pub fn new(
        base_url: String,
        timeout: Duration,
        max_attempts: u32,
    ) -> Result<Self, NotigateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotigateError::Store {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_attempts: max_attempts.max(1),
        })
    }

    /// Creates a client from the store config section.
    ///
    /// Errors when no URL is configured; the factory in [`crate::connect`]
    /// handles that case by selecting the in-memory store instead.
    pub fn from_config(config: &StoreConfig) -> Result<Self, NotigateError> {
        let url = config
            .url
            .clone()
            .ok_or_else(|| NotigateError::Config("store.url is not set".to_string()))?;
        Self::new(
            url,
            Duration::from_secs(config.timeout_secs),
            config.max_attempts,
        )
    }

    /// POST with bounded retry on transient statuses. A 404 means the
    /// collection does not exist and is surfaced as `Ok(None)`.
    async fn post_with_retry(
        &self,
        url: &str,
        body: &impl Serialize,
    ) -> Result<Option<String>, NotigateError> {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                warn!(attempt, url, "retrying store request after transient error");
                tokio::time::sleep(Duration::from_secs(attempt as u64 - 1)).await;
            }

            let response = self
                .client
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(|e| NotigateError::Store {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, url, "store response received");

            if status == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if status.is_success() {
                let text = response.text().await.map_err(|e| NotigateError::Store {
                    message: format!("failed to read store response: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return Ok(Some(text));
            }
            if is_transient_error(status) && attempt < self.max_attempts {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient store error, will retry");
                last_error = Some(NotigateError::store(format!(
                    "store returned {status}: {body}"
                )));
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(NotigateError::store(format!(
                "store returned {status}: {body}"
            )));
        }

        Err(last_error
            .unwrap_or_else(|| NotigateError::store("store request failed after retries")))
    }
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn search(
        &self,
        collection: &str,
        query: &str,
        filters: Option<&HashMap<String, String>>,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, NotigateError> {
        let url = format!("{}/collections/{collection}/query", self.base_url);
        let request = QueryRequest {
            query_text: query,
            n_results: top_k,
            r#where: filters,
        };

        let Some(body) = self.post_with_retry(&url, &request).await? else {
            debug!(collection, "collection missing, returning empty result");
            return Ok(Vec::new());
        };

        let response: QueryResponse =
            serde_json::from_str(&body).map_err(|e| NotigateError::Store {
                message: format!("malformed query response: {e}"),
                source: Some(Box::new(e)),
            })?;

        let ids = response.ids.into_iter().next().unwrap_or_default();
        let documents = response.documents.into_iter().next().unwrap_or_default();
        let metadatas = response.metadatas.into_iter().next().unwrap_or_default();
        let distances = response.distances.into_iter().next().unwrap_or_default();

        let mut metadatas = metadatas.into_iter();
        let results = ids
            .into_iter()
            .zip(documents)
            .zip(distances)
            .map(|((id, text), distance)| ScoredDocument {
                document: StoredDocument {
                    id,
                    text,
                    metadata: metadatas.next().flatten().unwrap_or_default(),
                },
                distance,
            })
            .collect();
        Ok(results)
    }

    async fn list_all(&self, collection: &str) -> Result<Vec<StoredDocument>, NotigateError> {
        let url = format!("{}/collections/{collection}/get", self.base_url);
        let Some(body) = self.post_with_retry(&url, &serde_json::json!({})).await? else {
            debug!(collection, "collection missing, returning empty listing");
            return Ok(Vec::new());
        };

        let response: GetResponse =
            serde_json::from_str(&body).map_err(|e| NotigateError::Store {
                message: format!("malformed get response: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut metadatas = response.metadatas.into_iter();
        let documents = response
            .ids
            .into_iter()
            .zip(response.documents)
            .map(|(id, text)| StoredDocument {
                id,
                text,
                metadata: metadatas.next().flatten().unwrap_or_default(),
            })
            .collect();
        Ok(documents)
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth
/// retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}
