// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic gate: content classification, RAG policy alignment, rendering,
//! channel requirements, and the LLM final adjudication.
//!
//! Five checks contribute to one result. A model or store failure inside a
//! check downgrades to a warning with partial results -- the gate itself
//! never throws.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use notigate_config::model::ValidationConfig;
use notigate_core::template::{
    Category, RetrievedCandidate, Template, ValidationResult, ValidationStage, render_placeholders,
};
use notigate_core::traits::{LanguageModel, VectorStore};
use notigate_core::types::RULES_COLLECTION;
use notigate_retrieval::Retriever;

use crate::constraint::{PRIVACY_RES, button_urls, is_valid_http_url};
use crate::verdict::{Severity, adjudication_prompt, parse_verdict, verdict_passes};

/// Keywords scoring a message as transactional.
const TRANSACTION_KEYWORDS: &[&str] = &[
    "주문", "결제", "배송", "구매", "거래", "승인", "완료", "확인", "발송", "도착", "픽업",
    "예약", "취소", "환불", "교환",
];

/// Keywords scoring a message as marketing.
const MARKETING_KEYWORDS: &[&str] = &[
    "할인", "이벤트", "프로모션", "특가", "세일", "쿠폰", "무료", "혜택", "선착순", "당첨",
    "기회", "마지막",
];

/// Marketing terms that must not appear in transactional guidelines' scope.
const MARKETING_TERMS: &[&str] = &["할인", "이벤트", "프로모션", "특가"];

/// Exaggerated financial claims.
const FINANCIAL_TERMS: &[&str] = &["100% 보장", "무조건", "반드시", "확실한 수익"];

/// Assertive medical claims.
const MEDICAL_TERMS: &[&str] = &["치료", "완치", "100% 효과", "즉시 개선"];

/// Opt-out mentions expected in marketing messages.
const UNSUBSCRIBE_MARKERS: &[&str] = &["수신거부", "거부", "080"];

/// Breadth of the guideline search feeding the alignment check.
const GUIDELINE_TOP_K: usize = 10;

/// Deterministic content classification outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentClassification {
    pub predicted: Category,
    pub confidence: f64,
    pub transaction_score: usize,
    pub marketing_score: usize,
    pub needs_manual_review: bool,
}

/// RAG-backed semantic validator.
pub struct SemanticValidator {
    model: Arc<dyn LanguageModel>,
    retriever: Retriever,
    config: ValidationConfig,
}

impl SemanticValidator {
    /// Creates a validator over the given collaborators.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn VectorStore>,
        config: ValidationConfig,
    ) -> Self {
        Self {
            model,
            retriever: Retriever::new(store),
            config,
        }
    }

    /// Run the semantic gate.
    ///
    /// `constraint` is the already-passed constraint-stage result; its
    /// summary is fed to the adjudication prompt.
    pub async fn validate(
        &self,
        template: &Template,
        constraint: Option<&ValidationResult>,
    ) -> ValidationResult {
        let mut result = ValidationResult::passing(ValidationStage::Semantic);
        let content = template.content();

        // 1. Keyword classification: cheap and deterministic, no model call.
        let classification = classify_content(&content);
        result.insert_detail(
            "classification",
            json!({
                "predicted_category": classification.predicted.to_string(),
                "confidence": classification.confidence,
                "transaction_score": classification.transaction_score,
                "marketing_score": classification.marketing_score,
                "needs_manual_review": classification.needs_manual_review,
            }),
        );

        // 2. Policy alignment against retrieved guidelines.
        self.check_policy_alignment(&content, &mut result).await;

        // 3. Rendering: violations only visible after substitution.
        self.check_rendering(template, &mut result);

        // 4. Channel requirements.
        check_channel_requirements(template, &mut result);

        // 5. Final adjudication gate.
        self.adjudicate(template, constraint, &content, &mut result)
            .await;

        result.insert_detail("total_errors", result.errors.len().into());
        result.insert_detail("total_warnings", result.warnings.len().into());
        result
    }

    async fn check_policy_alignment(&self, content: &str, result: &mut ValidationResult) {
        let guidelines = match self
            .retriever
            .search(RULES_COLLECTION, content, None, GUIDELINE_TOP_K)
            .await
        {
            Ok(guidelines) => guidelines,
            Err(e) => {
                warn!(error = %e, "guideline retrieval failed, skipping policy alignment");
                result.push_warning(format!("가이드라인 검색 실패, 정책 정렬 검사를 건너뜁니다: {e}"));
                return;
            }
        };

        let mut violated = 0usize;
        for guideline in &guidelines {
            if guideline.similarity <= self.config.guideline_similarity {
                continue;
            }
            let Some(reason) = guideline_violation(content, guideline) else {
                continue;
            };
            violated += 1;
            let severity = guideline
                .metadata
                .get("priority")
                .and_then(|v| v.as_str())
                .unwrap_or("medium");
            let message = format!("가이드라인 위반: {reason}");
            if matches!(severity, "critical" | "high") {
                result.push_error(message);
            } else {
                result.push_warning(message);
            }
        }
        debug!(
            retrieved = guidelines.len(),
            violated, "policy alignment complete"
        );
        result.insert_detail(
            "policy_alignment",
            json!({"retrieved": guidelines.len(), "violated": violated}),
        );
    }

    /// Substitute variables, then re-check length and URL well-formedness on
    /// the rendered text.
    fn check_rendering(&self, template: &Template, result: &mut ValidationResult) {
        let rendered_body = render_placeholders(&template.body, &template.variables);

        let unresolved = notigate_core::template::extract_placeholders(&rendered_body);
        if !unresolved.is_empty() {
            result.push_warning(format!(
                "치환되지 않은 변수가 남아 있습니다: {}",
                unresolved.join(", ")
            ));
        }

        let rendered_len = rendered_body.chars().count();
        if rendered_len > self.config.rendered_body_max {
            result.push_error(format!(
                "변수 치환 후 본문이 {}자를 초과합니다 (현재: {rendered_len}자)",
                self.config.rendered_body_max
            ));
        }

        for (idx, button) in template.buttons.iter().enumerate() {
            for url in button_urls(button) {
                let rendered_url = render_placeholders(url, &template.variables);
                if !is_valid_http_url(&rendered_url) {
                    result.push_error(format!(
                        "버튼 {}의 URL이 치환 후 유효하지 않습니다: {rendered_url}",
                        idx + 1
                    ));
                }
            }
        }
    }

    async fn adjudicate(
        &self,
        template: &Template,
        constraint: Option<&ValidationResult>,
        content: &str,
        result: &mut ValidationResult,
    ) {
        let excerpts = match self
            .retriever
            .search(
                RULES_COLLECTION,
                content,
                None,
                self.config.max_policy_excerpts,
            )
            .await
        {
            Ok(excerpts) => excerpts,
            Err(e) => {
                warn!(error = %e, "excerpt retrieval failed, adjudicating without context");
                Vec::new()
            }
        };

        let messages = adjudication_prompt(template, constraint, &excerpts);
        let verdict = match self.model.complete(&messages, None).await {
            Ok(reply) => match parse_verdict(&reply) {
                Ok(verdict) => verdict,
                Err(e) => {
                    warn!(error = %e, "adjudication reply unparseable, skipping final gate");
                    result.push_warning(format!("AI 기반 최종 검증을 건너뛰었습니다: {e}"));
                    return;
                }
            },
            Err(e) => {
                warn!(error = %e, "adjudication call failed, skipping final gate");
                result.push_warning(format!("AI 기반 최종 검증을 건너뛰었습니다: {e}"));
                return;
            }
        };

        // The pass rule is recomputed locally; the model's own claim is
        // informational only.
        let passed = verdict_passes(&verdict.violations);
        let critical = count(&verdict, Severity::Critical);
        let major = count(&verdict, Severity::Major);
        let minor = count(&verdict, Severity::Minor);
        result.insert_detail(
            "final_gate",
            json!({
                "passed": passed,
                "critical": critical,
                "major": major,
                "minor": minor,
                "summary": verdict.summary,
                "policy_refs": verdict.policy_refs,
            }),
        );

        if !passed {
            for violation in &verdict.violations {
                let message = format!(
                    "정책 위반 [{}]: {}",
                    violation.rule_id, violation.evidence
                );
                match violation.severity {
                    Severity::Critical | Severity::Major => result.push_error(message),
                    Severity::Minor => result.push_warning(message),
                }
            }
        }

        if verdict.autofix.enabled && !verdict.autofix.patch_body.is_empty() {
            result.push_warning(format!(
                "자동 수정 제안: {} -> {}",
                verdict.autofix.notes, verdict.autofix.patch_body
            ));
        }
    }
}

fn count(verdict: &crate::verdict::Verdict, severity: Severity) -> usize {
    verdict
        .violations
        .iter()
        .filter(|v| v.severity == severity)
        .count()
}

/// Keyword-frequency classification over disjoint transaction/marketing
/// keyword sets.
pub fn classify_content(content: &str) -> ContentClassification {
    let transaction_score = TRANSACTION_KEYWORDS
        .iter()
        .filter(|k| content.contains(**k))
        .count();
    let marketing_score = MARKETING_KEYWORDS
        .iter()
        .filter(|k| content.contains(**k))
        .count();
    let total = (transaction_score + marketing_score + 1) as f64;

    let (predicted, confidence) = if transaction_score > marketing_score {
        (Category::Transaction, transaction_score as f64 / total)
    } else if marketing_score > transaction_score {
        (Category::Marketing, marketing_score as f64 / total)
    } else if transaction_score > 0 {
        (Category::Mixed, 0.5)
    } else {
        (Category::NeedsReview, 0.0)
    };

    ContentClassification {
        predicted,
        confidence,
        transaction_score,
        marketing_score,
        needs_manual_review: confidence < 0.7,
    }
}

/// Category-keyed guideline violation predicate.
fn guideline_violation(content: &str, guideline: &RetrievedCandidate) -> Option<String> {
    let category = guideline
        .metadata
        .get("category")
        .and_then(|v| v.as_str())
        .unwrap_or("general");

    match category {
        "length" => {
            let limit: usize = regex_first_number(&guideline.text)?;
            let len = content.chars().count();
            (len > limit).then(|| format!("본문이 {limit}자를 초과했습니다 (현재: {len}자)"))
        }
        "content" => {
            if !(guideline.text.contains("거래성") && guideline.text.contains("마케팅")) {
                return None;
            }
            let found: Vec<&str> = MARKETING_TERMS
                .iter()
                .filter(|t| content.contains(**t))
                .copied()
                .collect();
            (!found.is_empty()).then(|| {
                format!(
                    "거래성 메시지에 마케팅 용어가 포함되어 있습니다: {}",
                    found.join(", ")
                )
            })
        }
        "marketing" => {
            if !guideline.text.contains("광고") {
                return None;
            }
            (!content.contains("(광고)") && !content.contains("광고"))
                .then(|| "마케팅 메시지에 광고 표기가 없습니다".to_string())
        }
        "privacy" => PRIVACY_RES
            .iter()
            .any(|re| re.is_match(content))
            .then(|| "개인정보가 포함된 것으로 의심됩니다".to_string()),
        "financial" => {
            let found: Vec<&str> = FINANCIAL_TERMS
                .iter()
                .filter(|t| content.contains(**t))
                .copied()
                .collect();
            (!found.is_empty()).then(|| {
                format!(
                    "금융 관련 과장 표현이 포함되어 있습니다: {}",
                    found.join(", ")
                )
            })
        }
        "medical" => {
            let found: Vec<&str> = MEDICAL_TERMS
                .iter()
                .filter(|t| content.contains(**t))
                .copied()
                .collect();
            (!found.is_empty()).then(|| {
                format!(
                    "의료 관련 단정적 표현이 포함되어 있습니다: {}",
                    found.join(", ")
                )
            })
        }
        _ => None,
    }
}

fn regex_first_number(text: &str) -> Option<usize> {
    use std::sync::LazyLock;
    static RE: LazyLock<regex::Regex> =
        LazyLock::new(|| regex::Regex::new(r"(\d+)").expect("number regex"));
    RE.captures(text).and_then(|caps| caps[1].parse().ok())
}

/// Channel-mandated tags: marketing messages need the advertisement marker
/// and should mention an opt-out path.
fn check_channel_requirements(template: &Template, result: &mut ValidationResult) {
    if template.is_promotional() {
        if !template.body.contains("(광고)") && !template.body.contains("광고") {
            result.push_error("마케팅성 메시지에는 '(광고)' 표기가 필요합니다".to_string());
        }
        if template.category == Some(Category::Marketing)
            && !UNSUBSCRIBE_MARKERS.iter().any(|m| template.body.contains(m))
        {
            result.push_warning(
                "마케팅 메시지에는 수신거부 안내를 포함하는 것을 권장합니다".to_string(),
            );
        }
    }
}
