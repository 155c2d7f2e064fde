// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-backed message analysis for Notigate.
//!
//! Three independent classifiers over one [`notigate_core::LanguageModel`]
//! handle: message-type, sub-category (closed candidate list), and
//! structured-field extraction. Failures degrade to deterministic defaults
//! so the surrounding pipeline never aborts on a classification problem.

pub mod classifier;
pub mod prompts;
pub mod types;

pub use classifier::MessageClassifier;
pub use types::{
    CategoryClassification, FieldExtraction, MessageAnalysis, MessageType, TypeClassification,
};
