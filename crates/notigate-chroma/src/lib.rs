// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store backends for Notigate.
//!
//! Two [`VectorStore`] implementations -- a remote Chroma-style HTTP client
//! and a deterministic in-memory fallback -- selected once at construction
//! by [`connect`]. Request paths never branch on store availability.

use std::sync::Arc;

use tracing::info;

use notigate_config::model::StoreConfig;
use notigate_core::NotigateError;
use notigate_core::traits::VectorStore;

pub mod memory;
pub mod remote;

pub use memory::MemoryVectorStore;
pub use remote::ChromaStore;

/// Build the vector store implementation the configuration names.
///
/// A configured `store.url` selects the remote client; otherwise the
/// in-memory fallback is used. The choice is made exactly once, here.
pub fn connect(config: &StoreConfig) -> Result<Arc<dyn VectorStore>, NotigateError> {
    match &config.url {
        Some(url) => {
            info!(url, "using remote vector store");
            Ok(Arc::new(ChromaStore::from_config(config)?))
        }
        None => {
            info!("no store.url configured, using in-memory vector store");
            Ok(Arc::new(MemoryVectorStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_selects_remote_when_url_set() {
        let config = StoreConfig {
            url: Some("http://localhost:8000".into()),
            ..StoreConfig::default()
        };
        assert!(connect(&config).is_ok());
    }

    #[tokio::test]
    async fn factory_selects_memory_when_url_absent() {
        let store = connect(&StoreConfig::default()).unwrap();
        // The in-memory store starts empty; a search must succeed and
        // return nothing rather than erroring.
        let result = store.search("approved", "주문", None, 3).await.unwrap();
        assert!(result.is_empty());
    }
}
