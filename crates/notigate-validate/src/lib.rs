// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-gate template validation for Notigate.
//!
//! The constraint gate is deterministic and rule-driven; the semantic gate
//! layers keyword classification, RAG policy alignment, rendering checks,
//! channel requirements, and an LLM final adjudication. The pipeline
//! composes them with short-circuit-on-failure semantics.

pub mod constraint;
pub mod pipeline;
pub mod semantic;
pub mod verdict;

pub use constraint::ConstraintValidator;
pub use pipeline::{PipelineOutcome, ValidationPipeline};
pub use semantic::{ContentClassification, SemanticValidator, classify_content};
pub use verdict::{Autofix, Severity, Verdict, VerdictViolation, verdict_passes};
