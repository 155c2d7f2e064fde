// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-backed message analysis: type, category, structured fields.
//!
//! All three calls degrade uniformly: a service failure or unparseable
//! reply yields a deterministic default plus a logged warning, never an
//! error to the caller. Classification must not be able to sink the
//! pipeline.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use notigate_core::NotigateError;
use notigate_core::template::extract_placeholders;
use notigate_core::traits::LanguageModel;

use crate::prompts::{category_prompt, fields_prompt, type_prompt};
use crate::types::{
    CategoryClassification, FieldExtraction, MessageAnalysis, MessageType, TypeClassification,
};

/// Fallback sub-category when the candidate list is empty.
const FALLBACK_CATEGORY: &str = "기타";

/// Raw wire shape of a type-classification reply.
#[derive(Debug, Deserialize)]
struct TypeReply {
    #[serde(default)]
    has_channel_link: bool,
    #[serde(default)]
    has_extra_info: bool,
    #[serde(default)]
    explanation: String,
}

/// Raw wire shape of a category reply.
#[derive(Debug, Deserialize)]
struct CategoryReply {
    category_sub: String,
    #[serde(default)]
    explanation: String,
}

/// Raw wire shape of a field-extraction reply.
#[derive(Debug, Deserialize)]
struct FieldsReply {
    #[serde(default)]
    intent_type: Option<String>,
    #[serde(default)]
    recipient_scope: Option<String>,
    #[serde(default)]
    links_allowed: Option<bool>,
    #[serde(default)]
    variables: Vec<String>,
}

/// Message analyzer over a language model handle.
pub struct MessageClassifier {
    model: Arc<dyn LanguageModel>,
    model_id: Option<String>,
}

impl MessageClassifier {
    /// Creates a classifier using the model's default model id.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            model_id: None,
        }
    }

    /// Overrides the model id for all classification calls.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Classify the message type from the two orthogonal booleans.
    ///
    /// Never fails: malformed output or a service error yields the Basic
    /// default with a warning.
    pub async fn classify_type(&self, user_text: &str, hints: &[String]) -> TypeClassification {
        match self.try_classify_type(user_text, hints).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "type classification failed, using BASIC default");
                TypeClassification::default()
            }
        }
    }

    async fn try_classify_type(
        &self,
        user_text: &str,
        hints: &[String],
    ) -> Result<TypeClassification, NotigateError> {
        let mut builder = type_prompt(user_text);
        for hint in hints {
            builder = builder.add_hint(hint.clone());
        }
        let reply = self
            .model
            .complete(&builder.build(), self.model_id.as_deref())
            .await?;

        let parsed: TypeReply = parse_json_reply(&reply)?;
        // The flags are authoritative: recombining them guarantees the
        // four-way rule holds even when the model names a different type.
        let message_type =
            MessageType::from_flags(parsed.has_channel_link, parsed.has_extra_info);
        debug!(%message_type, "type classification complete");
        Ok(TypeClassification {
            message_type,
            has_channel_link: parsed.has_channel_link,
            has_extra_info: parsed.has_extra_info,
            explanation: parsed.explanation,
        })
    }

    /// Classify the sub-category, constrained to `candidates`.
    ///
    /// Never fails: an out-of-list answer, malformed output, or a service
    /// error falls back to the first candidate with a warning.
    pub async fn classify_category(
        &self,
        user_text: &str,
        category_main: &str,
        candidates: &[String],
    ) -> CategoryClassification {
        let fallback = || CategoryClassification {
            category_sub: candidates
                .first()
                .cloned()
                .unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
            explanation: String::new(),
        };

        match self
            .try_classify_category(user_text, category_main, candidates)
            .await
        {
            Ok(result) if candidates.contains(&result.category_sub) => result,
            Ok(result) => {
                warn!(
                    invented = %result.category_sub,
                    "category classifier answered outside the candidate list, using first candidate"
                );
                fallback()
            }
            Err(e) => {
                warn!(error = %e, "category classification failed, using first candidate");
                fallback()
            }
        }
    }

    async fn try_classify_category(
        &self,
        user_text: &str,
        category_main: &str,
        candidates: &[String],
    ) -> Result<CategoryClassification, NotigateError> {
        let messages = category_prompt(user_text, category_main, candidates).build();
        let reply = self
            .model
            .complete(&messages, self.model_id.as_deref())
            .await?;
        let parsed: CategoryReply = parse_json_reply(&reply)?;
        debug!(category_sub = %parsed.category_sub, "category classification complete");
        Ok(CategoryClassification {
            category_sub: parsed.category_sub,
            explanation: parsed.explanation,
        })
    }

    /// Extract structured fields, with optional hints from earlier steps.
    ///
    /// Never fails: the fallback keeps a deterministic local scan of
    /// `#{name}` placeholders so drafting still sees explicit variables.
    pub async fn extract_fields(&self, user_text: &str, hints: &[String]) -> FieldExtraction {
        match self.try_extract_fields(user_text, hints).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "field extraction failed, using placeholder scan");
                FieldExtraction {
                    intent_type: "정보성".to_string(),
                    recipient_scope: "전체회원".to_string(),
                    links_allowed: true,
                    variables: extract_placeholders(user_text),
                }
            }
        }
    }

    async fn try_extract_fields(
        &self,
        user_text: &str,
        hints: &[String],
    ) -> Result<FieldExtraction, NotigateError> {
        let mut builder = fields_prompt(user_text);
        for hint in hints {
            builder = builder.add_hint(hint.clone());
        }
        let reply = self
            .model
            .complete(&builder.build(), self.model_id.as_deref())
            .await?;
        let parsed: FieldsReply = parse_json_reply(&reply)?;

        // Union the model's variables with the explicit placeholder scan so
        // `#{name}` tokens are never dropped.
        let mut variables = parsed.variables;
        for name in extract_placeholders(user_text) {
            if !variables.contains(&name) {
                variables.push(name);
            }
        }

        Ok(FieldExtraction {
            intent_type: parsed.intent_type.unwrap_or_else(|| "정보성".to_string()),
            recipient_scope: parsed
                .recipient_scope
                .unwrap_or_else(|| "전체회원".to_string()),
            links_allowed: parsed.links_allowed.unwrap_or(true),
            variables,
        })
    }

    /// Run the full analysis: type and category concurrently (they depend
    /// only on the raw text), then field extraction hinted with both.
    pub async fn analyze(
        &self,
        user_text: &str,
        category_main: &str,
        candidates: &[String],
    ) -> MessageAnalysis {
        let (type_result, category_result) = tokio::join!(
            self.classify_type(user_text, &[]),
            self.classify_category(user_text, category_main, candidates),
        );

        let hint = format!(
            "[힌트] 메시지 유형: {} / 카테고리: {}",
            type_result.message_type, category_result.category_sub
        );
        let fields = self.extract_fields(user_text, &[hint]).await;

        MessageAnalysis {
            type_result,
            category_result,
            fields,
        }
    }
}

/// Parse a JSON object out of a model reply.
///
/// Tolerates leading/trailing prose by slicing from the first `{` to the
/// last `}`; anything that still fails serde is a [`NotigateError::Parse`].
fn parse_json_reply<T: serde::de::DeserializeOwned>(reply: &str) -> Result<T, NotigateError> {
    let trimmed = reply.trim();
    let start = trimmed.find('{').unwrap_or(0);
    let end = trimmed.rfind('}').map(|i| i + 1).unwrap_or(trimmed.len());
    let json_str = &trimmed[start..end.max(start)];
    serde_json::from_str(json_str).map_err(|e| NotigateError::parse(format!("{e}: {reply}")))
}
