// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template generator: classify, retrieve, branch, compose.
//!
//! Strategy order is strongest-evidence-first: approved references above the
//! similarity threshold, then policy guidelines, then rules-only creation.
//! A failed strategy falls back to the next-weaker one; only when every
//! strategy has failed does the result carry `generation_method = failed`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use notigate_classify::MessageClassifier;
use notigate_config::model::GenerationConfig;
use notigate_core::NotigateError;
use notigate_core::template::{
    GenerationMethod, GenerationRequest, GenerationResult, RetrievedCandidate,
    extract_placeholders,
};
use notigate_core::traits::{LanguageModel, VectorStore};
use notigate_core::types::{APPROVED_COLLECTION, RULES_COLLECTION};
use notigate_retrieval::{Retriever, select};

use crate::prompts::{new_creation_prompt, policy_prompt, reference_prompt, title_prompt};

/// Guideline documents fed to the policy-guided strategy. Kept small -- too
/// much policy text confuses the generation.
const GUIDELINE_COUNT: usize = 2;

/// Four-step template generation flow.
pub struct TemplateGenerator {
    model: Arc<dyn LanguageModel>,
    classifier: MessageClassifier,
    retriever: Retriever,
    config: GenerationConfig,
}

impl TemplateGenerator {
    /// Wires the generator over the shared collaborators.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn VectorStore>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            classifier: MessageClassifier::new(model.clone()),
            model,
            retriever: Retriever::new(store),
            config,
        }
    }

    /// Run one generation request. Always returns a result value; total
    /// failure is expressed as `generation_method = failed`.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        // Steps 1 and 2: type and category are independent given the raw
        // text and run concurrently.
        let (type_result, category_result) = tokio::join!(
            self.classifier.classify_type(&request.user_text, &[]),
            self.classifier.classify_category(
                &request.user_text,
                &request.category_main,
                &request.category_sub_candidates,
            ),
        );
        info!(
            message_type = %type_result.message_type,
            category_sub = %category_result.category_sub,
            "classification complete"
        );

        // Step 3: retrieval over the approved corpus, filtered by category.
        let filters = HashMap::from([
            ("category_main".to_string(), request.category_main.clone()),
            ("category_sub".to_string(), category_result.category_sub.clone()),
        ]);
        let candidates = match self
            .retriever
            .search(
                APPROVED_COLLECTION,
                &request.user_text,
                Some(&filters),
                self.config.top_k,
            )
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "approved-template retrieval failed, continuing without references");
                Vec::new()
            }
        };
        let max_similarity = Retriever::max_similarity(&candidates);
        let selected = select(candidates, self.config.select_count);
        info!(
            selected = selected.len(),
            max_similarity, "reference retrieval complete"
        );

        // Step 4: branched generation with the fallback chain.
        let (template_text, generation_method, reference_ids) = match self
            .generate_body(request, &category_result.category_sub, &selected, max_similarity)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "every generation strategy failed");
                let mut failed = GenerationResult::failed(format!("템플릿 생성 실패: {e}"));
                failed.metadata = json!({
                    "message_type": type_result.message_type.to_string(),
                    "category_sub": category_result.category_sub,
                    "max_similarity": max_similarity,
                })
                .as_object()
                .cloned()
                .unwrap_or_default();
                return failed;
            }
        };

        // Step 5: short title from the produced body.
        let template_title = self
            .generate_title(&template_text, &category_result.category_sub)
            .await;

        // Step 6: variables via the fixed #{name} token pattern.
        let variables_detected = extract_placeholders(&template_text);

        GenerationResult {
            template_text,
            template_title,
            variables_detected,
            generation_method,
            reference_ids,
            metadata: json!({
                "message_type": type_result.message_type.to_string(),
                "has_channel_link": type_result.has_channel_link,
                "has_extra_info": type_result.has_extra_info,
                "category_main": request.category_main,
                "category_sub": category_result.category_sub,
                "max_similarity": max_similarity,
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
            error_message: None,
        }
    }

    /// The branched strategy chain. Returns the body text, the strategy
    /// that produced it, and the reference ids it used.
    async fn generate_body(
        &self,
        request: &GenerationRequest,
        category_sub: &str,
        selected: &[RetrievedCandidate],
        max_similarity: f32,
    ) -> Result<(String, GenerationMethod, Vec<String>), NotigateError> {
        let model_id = request.model.as_deref();

        if !selected.is_empty() && max_similarity >= self.config.reference_similarity {
            debug!(max_similarity, "trying reference-based generation");
            let messages = reference_prompt(&request.user_text, selected);
            match self.model.complete(&messages, model_id).await {
                Ok(text) => {
                    let ids = selected.iter().map(|c| c.id.clone()).collect();
                    return Ok((text, GenerationMethod::ReferenceBased, ids));
                }
                Err(e) => {
                    warn!(error = %e, "reference-based generation failed, falling back to policy-guided");
                }
            }
        }

        let guideline_query = format!("{} {category_sub}", request.category_main);
        let guidelines = match self
            .retriever
            .search(RULES_COLLECTION, &guideline_query, None, GUIDELINE_COUNT)
            .await
        {
            Ok(guidelines) => guidelines,
            Err(e) => {
                warn!(error = %e, "guideline retrieval failed, skipping policy-guided strategy");
                Vec::new()
            }
        };

        if !guidelines.is_empty() {
            debug!(count = guidelines.len(), "trying policy-guided generation");
            let messages = policy_prompt(&request.user_text, &guidelines);
            match self.model.complete(&messages, model_id).await {
                Ok(text) => {
                    let ids = guidelines.iter().map(|g| g.id.clone()).collect();
                    return Ok((text, GenerationMethod::PolicyGuided, ids));
                }
                Err(e) => {
                    warn!(error = %e, "policy-guided generation failed, falling back to new creation");
                }
            }
        }

        debug!("trying new-creation generation");
        let messages = new_creation_prompt(&request.user_text);
        let text = self.model.complete(&messages, model_id).await?;
        Ok((text, GenerationMethod::NewCreation, Vec::new()))
    }

    /// Generate a short title; deterministic fallback to the sub-category
    /// name when the model call fails.
    async fn generate_title(&self, body: &str, category_sub: &str) -> String {
        let messages = title_prompt(body, self.config.title_max_chars);
        match self.model.complete(&messages, None).await {
            Ok(title) => truncate_chars(title.trim(), self.config.title_max_chars),
            Err(e) => {
                warn!(error = %e, "title generation failed, using category name");
                truncate_chars(category_sub, self.config.title_max_chars)
            }
        }
    }
}

/// Cap a string at `max` characters (not bytes -- titles are Korean).
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
