// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-gate validation pipeline.
//!
//! START -> CONSTRAINT -> (fail -> END) -> SEMANTIC -> (fail -> END)
//! -> MERGE -> END. A failed gate's result *is* the final result; the later
//! gate never runs. On success of both, the final result is the merged
//! union tagged `final`.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use notigate_config::model::ValidationConfig;
use notigate_core::template::{Template, ValidationResult, ValidationStage};
use notigate_core::traits::{LanguageModel, VectorStore};

use crate::constraint::ConstraintValidator;
use crate::semantic::SemanticValidator;

/// Per-stage and final results of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub constraint: ValidationResult,
    pub semantic: Option<ValidationResult>,
    pub final_result: ValidationResult,
}

/// The two-gate validation pipeline.
pub struct ValidationPipeline {
    constraint: ConstraintValidator,
    semantic: SemanticValidator,
}

impl ValidationPipeline {
    /// Wires both gates over the shared collaborators.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn VectorStore>,
        config: ValidationConfig,
    ) -> Self {
        Self {
            constraint: ConstraintValidator::new(store.clone()),
            semantic: SemanticValidator::new(model, store, config),
        }
    }

    /// Run the state machine for one template.
    pub async fn validate(&self, template: &Template) -> PipelineOutcome {
        debug!("constraint gate starting");
        let constraint = self.constraint.validate(template).await;

        if !constraint.is_valid {
            info!(
                errors = constraint.errors.len(),
                "constraint gate failed, short-circuiting"
            );
            return PipelineOutcome {
                final_result: constraint.clone(),
                constraint,
                semantic: None,
            };
        }

        debug!("semantic gate starting");
        let semantic = self.semantic.validate(template, Some(&constraint)).await;

        if !semantic.is_valid {
            info!(
                errors = semantic.errors.len(),
                "semantic gate failed, its result is final"
            );
            return PipelineOutcome {
                constraint,
                final_result: semantic.clone(),
                semantic: Some(semantic),
            };
        }

        let final_result = merge(&constraint, &semantic);
        info!(
            warnings = final_result.warnings.len(),
            "both gates passed"
        );
        PipelineOutcome {
            constraint,
            semantic: Some(semantic),
            final_result,
        }
    }
}

/// Union of both passed stages, tagged `final`.
fn merge(constraint: &ValidationResult, semantic: &ValidationResult) -> ValidationResult {
    let mut merged = ValidationResult::passing(ValidationStage::Final);
    merged.absorb(constraint);
    merged.absorb(semantic);
    merged.insert_detail(
        "validation_summary",
        json!({
            "constraint_passed": constraint.is_valid,
            "semantic_passed": semantic.is_valid,
            "overall_passed": merged.is_valid,
        }),
    );
    merged.insert_detail("total_errors", merged.errors.len().into());
    merged.insert_detail("total_warnings", merged.warnings.len().into());
    merged
}
