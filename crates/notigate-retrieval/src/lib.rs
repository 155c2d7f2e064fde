// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval engine over the vector store.
//!
//! Converts store distances into clamped similarities (similarity =
//! 1 − distance), assigns ranks, and applies the select-n-of-top-k policy:
//! search broadly, keep the best few.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use notigate_core::NotigateError;
use notigate_core::template::RetrievedCandidate;
use notigate_core::traits::VectorStore;

/// Default breadth of a similarity search.
pub const DEFAULT_TOP_K: usize = 3;

/// Default number of candidates kept after narrowing.
pub const DEFAULT_SELECT_COUNT: usize = 2;

/// Retrieval engine wrapping a [`VectorStore`].
pub struct Retriever {
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    /// Creates a new retriever over the given store.
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Similarity search returning candidates ordered by similarity
    /// descending, rank starting at 1.
    ///
    /// Distance semantics are backend-dependent, so similarity is clamped
    /// to [0, 1] here rather than trusting the store.
    pub async fn search(
        &self,
        collection: &str,
        query: &str,
        filters: Option<&HashMap<String, String>>,
        top_k: usize,
    ) -> Result<Vec<RetrievedCandidate>, NotigateError> {
        let scored = self.store.search(collection, query, filters, top_k).await?;

        let mut candidates: Vec<RetrievedCandidate> = scored
            .into_iter()
            .map(|hit| RetrievedCandidate {
                id: hit.document.id,
                text: hit.document.text,
                metadata: hit.document.metadata,
                similarity: (1.0 - hit.distance).clamp(0.0, 1.0),
                rank: 0,
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (idx, candidate) in candidates.iter_mut().enumerate() {
            candidate.rank = idx + 1;
        }

        debug!(
            collection,
            count = candidates.len(),
            max_similarity = candidates.first().map(|c| c.similarity).unwrap_or(0.0),
            "retrieval complete"
        );
        Ok(candidates)
    }

    /// Highest similarity among candidates, 0.0 when empty.
    pub fn max_similarity(candidates: &[RetrievedCandidate]) -> f32 {
        candidates
            .iter()
            .map(|c| c.similarity)
            .fold(0.0, f32::max)
    }
}

/// Keep the best `select_count` candidates of an already-ordered search
/// result.
pub fn select(
    mut candidates: Vec<RetrievedCandidate>,
    select_count: usize,
) -> Vec<RetrievedCandidate> {
    candidates.truncate(select_count);
    candidates
}
