// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory vector store fallback.
//!
//! Scores documents with token-overlap (Jaccard) distance: deterministic,
//! dependency-free, and sufficient for degraded operation and tests. The
//! remote store remains the production backend.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use notigate_core::NotigateError;
use notigate_core::traits::VectorStore;
use notigate_core::types::{ScoredDocument, StoredDocument};

/// An in-memory store of named collections.
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
}

impl MemoryVectorStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a document into a collection, creating the collection on
    /// first use. A document with an existing id replaces the old one.
    pub fn insert(&self, collection: &str, document: StoredDocument) {
        let mut collections = self.collections.write().expect("store lock poisoned");
        let docs = collections.entry(collection.to_string()).or_default();
        docs.retain(|d| d.id != document.id);
        docs.push(document);
    }

    /// Insert many documents at once.
    pub fn insert_many(&self, collection: &str, documents: Vec<StoredDocument>) {
        for document in documents {
            self.insert(collection, document);
        }
    }

    /// Number of documents in a collection (missing collections count 0).
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .expect("store lock poisoned")
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Whether a collection is absent or empty.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn search(
        &self,
        collection: &str,
        query: &str,
        filters: Option<&HashMap<String, String>>,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, NotigateError> {
        let collections = self.collections.read().expect("store lock poisoned");
        let Some(docs) = collections.get(collection) else {
            debug!(collection, "collection missing, returning empty result");
            return Ok(Vec::new());
        };

        let query_tokens = tokenize(query);
        let mut scored: Vec<ScoredDocument> = docs
            .iter()
            .filter(|doc| matches_filters(doc, filters))
            .map(|doc| ScoredDocument {
                document: doc.clone(),
                distance: 1.0 - jaccard(&query_tokens, &tokenize(&doc.text)),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn list_all(&self, collection: &str) -> Result<Vec<StoredDocument>, NotigateError> {
        let collections = self.collections.read().expect("store lock poisoned");
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }
}

fn matches_filters(doc: &StoredDocument, filters: Option<&HashMap<String, String>>) -> bool {
    let Some(filters) = filters else {
        return true;
    };
    filters
        .iter()
        .all(|(key, value)| doc.meta_str(key) == Some(value.as_str()))
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Jaccard similarity of two token sets, in [0, 1].
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f32;
    let union = a.union(b).count() as f32;
    intersection / union
}
