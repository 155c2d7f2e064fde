// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Notigate compliance and generation pipeline.
//!
//! This crate provides the trait definitions for the two external
//! collaborators (language model service, vector store), the shared error
//! type, and the domain model used throughout the Notigate workspace.

pub mod error;
pub mod rules;
pub mod template;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::NotigateError;
pub use rules::{RuleDocument, RuleEnforcement, RuleKind, RulePriority};
pub use template::{
    Button, ButtonKind, Category, Channel, GenerationMethod, GenerationRequest, GenerationResult,
    RetrievedCandidate, Template, ValidationResult, ValidationStage,
};
pub use traits::{LanguageModel, VectorStore};
pub use types::{
    APPROVED_COLLECTION, ChatMessage, Role, RULES_COLLECTION, ScoredDocument, StoredDocument,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct_and_display() {
        let service = NotigateError::service("model unreachable");
        assert!(service.to_string().contains("model unreachable"));

        let store = NotigateError::store("collection query failed");
        assert!(store.to_string().contains("collection query failed"));

        let parse = NotigateError::parse("not JSON");
        assert!(parse.to_string().contains("not JSON"));

        let timeout = NotigateError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        assert!(timeout.to_string().contains("30"));
    }

    #[test]
    fn trait_objects_are_constructible() {
        // Both collaborator traits must stay object-safe; the pipeline holds
        // them as Arc<dyn ...>.
        fn _assert_model(_: &dyn LanguageModel) {}
        fn _assert_store(_: &dyn VectorStore) {}
    }

    #[test]
    fn collection_names_match_corpus_layout() {
        assert_eq!(RULES_COLLECTION, "policy_guidelines");
        assert_eq!(APPROVED_COLLECTION, "approved");
    }
}
