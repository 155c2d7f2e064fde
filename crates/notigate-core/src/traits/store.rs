// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store trait over the rule/guideline and approved-template corpora.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::NotigateError;
use crate::types::{ScoredDocument, StoredDocument};

/// A document store with similarity search and exhaustive listing.
///
/// Collections are addressed by name (see
/// [`crate::types::RULES_COLLECTION`] / [`crate::types::APPROVED_COLLECTION`]).
/// A collection that does not exist behaves as an empty one -- lookups return
/// empty lists rather than errors.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Similarity search over a collection, optionally restricted to
    /// documents whose metadata matches every `filters` entry exactly.
    ///
    /// Results are ordered nearest-first (smallest distance first).
    async fn search(
        &self,
        collection: &str,
        query: &str,
        filters: Option<&HashMap<String, String>>,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, NotigateError>;

    /// Full listing of a collection. Used by the constraint validator, which
    /// must be exhaustive rather than approximate.
    async fn list_all(&self, collection: &str) -> Result<Vec<StoredDocument>, NotigateError>;
}
