// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Constraint gate: deterministic, rule-driven structural validation.
//!
//! Fetches every constraint/rule document from the rules collection (a full
//! listing -- constraint checking must be exhaustive, not approximate) and
//! dispatches each to a check function: exact metadata fields first, then
//! category-name heuristics when metadata is sparse. Two absolute invariants
//! run unconditionally so a lost rule corpus cannot wave everything through.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use notigate_core::rules::RuleDocument;
use notigate_core::template::{Button, ButtonKind, Template, ValidationResult, ValidationStage};
use notigate_core::traits::VectorStore;
use notigate_core::types::RULES_COLLECTION;

/// Absolute body length ceiling, enforced even with no rule corpus.
const ABSOLUTE_BODY_MAX: usize = 2000;

/// Absolute button count ceiling, enforced even with no rule corpus.
const ABSOLUTE_BUTTON_MAX: usize = 10;

/// Button name length ceiling.
const BUTTON_NAME_MAX: usize = 14;

/// Button count ceiling used by the button-shape heuristic.
const BUTTON_COUNT_MAX: usize = 5;

static FIRST_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("number regex"));

static QUOTED_TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("quoted term regex"));

/// Patterns that look like personal data: resident registration, card, and
/// account numbers.
pub(crate) static PRIVACY_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d{6}-\d{7}",
        r"\d{4}-\d{4}-\d{4}-\d{4}",
        r"\d{3}-\d{2,3}-\d{6}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("privacy regex"))
    .collect()
});

/// Rule-driven structural validator over the rules collection.
pub struct ConstraintValidator {
    store: Arc<dyn VectorStore>,
}

impl ConstraintValidator {
    /// Creates a validator over the given store.
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Run the constraint gate.
    ///
    /// Violations never escape as errors-by-value; they accumulate into the
    /// returned result. A store failure downgrades to a warning while the
    /// absolute invariants still run.
    pub async fn validate(&self, template: &Template) -> ValidationResult {
        let mut result = ValidationResult::passing(ValidationStage::Constraint);

        check_absolute_invariants(template, &mut result);

        match self.store.list_all(RULES_COLLECTION).await {
            Ok(documents) => {
                let mut checked = 0usize;
                for document in &documents {
                    let rule = RuleDocument::from_document(document);
                    if !rule.is_constraint() {
                        continue;
                    }
                    checked += 1;
                    if let Some(violation) = check_rule(template, &rule) {
                        let message = format!("스키마 제약 위반 [{}]: {violation}", rule.id);
                        if rule.violation_is_error() {
                            result.push_error(message);
                        } else {
                            result.push_warning(message);
                        }
                    }
                }
                debug!(checked, "constraint rules evaluated");
                result.insert_detail("rules_checked", checked.into());
            }
            Err(e) => {
                warn!(error = %e, "rule listing failed, only absolute invariants were checked");
                result
                    .push_warning(format!("제약 규칙 조회 실패, 기본 불변식만 검사했습니다: {e}"));
                result.insert_detail("rules_checked", 0.into());
            }
        }

        result.insert_detail("total_errors", result.errors.len().into());
        result.insert_detail("total_warnings", result.warnings.len().into());
        result
    }
}

/// Invariants that hold regardless of rule-store availability.
fn check_absolute_invariants(template: &Template, result: &mut ValidationResult) {
    let body_len = template.body.chars().count();
    if template.body.trim().is_empty() {
        result.push_error("본문은 빈 값일 수 없습니다".to_string());
    }
    if body_len > ABSOLUTE_BODY_MAX {
        result.push_error(format!(
            "본문이 절대 한도 {ABSOLUTE_BODY_MAX}자를 초과했습니다 (현재: {body_len}자)"
        ));
    }
    if template.buttons.len() > ABSOLUTE_BUTTON_MAX {
        result.push_error(format!(
            "버튼이 절대 한도 {ABSOLUTE_BUTTON_MAX}개를 초과했습니다 (현재: {}개)",
            template.buttons.len()
        ));
    }
}

/// Dispatch a single rule to its check function.
///
/// Exact metadata fields select the check directly; without them the rule's
/// category name picks a heuristic. Returns the violation description, or
/// `None` when the template complies (or the rule is not checkable).
fn check_rule(template: &Template, rule: &RuleDocument) -> Option<String> {
    if let Some(max) = rule.max_length {
        return check_max_length(template, rule.field.as_deref(), max);
    }
    if !rule.forbidden_words.is_empty() {
        return check_forbidden_words(template, &rule.forbidden_words);
    }
    if let Some(max) = rule.max_buttons {
        return check_max_buttons(template, max);
    }
    if !rule.required_fields.is_empty() {
        return check_required_fields(template, &rule.required_fields);
    }

    match rule.category.as_deref() {
        Some(c) if c.contains("length") => {
            let max = FIRST_NUMBER_RE
                .captures(&rule.content)
                .and_then(|caps| caps[1].parse::<usize>().ok())?;
            check_max_length(template, Some("body"), max)
        }
        Some(c) if c.contains("forbidden") => {
            let words: Vec<String> = QUOTED_TERM_RE
                .captures_iter(&rule.content)
                .map(|caps| caps[1].to_string())
                .collect();
            if words.is_empty() {
                None
            } else {
                check_forbidden_words(template, &words)
            }
        }
        Some(c) if c.contains("button") => check_button_shapes(template),
        Some(c) if c.contains("variable") => check_variables(template),
        Some(c) if c.contains("url") || c.contains("domain") => check_button_urls(template),
        Some(c) if c.contains("marketing") => check_marketing_disclosure(template),
        Some(c) if c.contains("privacy") => check_privacy(template),
        _ => None,
    }
}

fn check_max_length(template: &Template, field: Option<&str>, max: usize) -> Option<String> {
    let (label, len) = match field.unwrap_or("body") {
        "title" => (
            "제목",
            template.title.as_deref().unwrap_or_default().chars().count(),
        ),
        _ => ("본문", template.body.chars().count()),
    };
    (len > max).then(|| format!("{label}이 {max}자를 초과했습니다 (현재: {len}자)"))
}

fn check_forbidden_words(template: &Template, words: &[String]) -> Option<String> {
    let content = template.content();
    let found: Vec<&str> = words
        .iter()
        .filter(|w| content.contains(w.as_str()))
        .map(String::as_str)
        .collect();
    (!found.is_empty()).then(|| format!("금지 단어가 포함되어 있습니다: {}", found.join(", ")))
}

fn check_max_buttons(template: &Template, max: usize) -> Option<String> {
    let count = template.buttons.len();
    (count > max).then(|| format!("버튼이 최대 {max}개를 초과했습니다 (현재: {count}개)"))
}

fn check_required_fields(template: &Template, required: &[String]) -> Option<String> {
    let missing: Vec<&str> = required
        .iter()
        .filter(|field| !has_field(template, field))
        .map(String::as_str)
        .collect();
    (!missing.is_empty()).then(|| format!("필수 필드가 없습니다: {}", missing.join(", ")))
}

fn has_field(template: &Template, field: &str) -> bool {
    match field {
        "title" => template.title.as_deref().is_some_and(|t| !t.trim().is_empty()),
        "body" => !template.body.trim().is_empty(),
        "buttons" => !template.buttons.is_empty(),
        "variables" => !template.variables.is_empty(),
        "category" => template.category.is_some(),
        _ => false,
    }
}

/// Button shape requirements: non-blank names within length, the count
/// ceiling, and kind-specific link fields.
fn check_button_shapes(template: &Template) -> Option<String> {
    if template.buttons.len() > BUTTON_COUNT_MAX {
        return Some(format!(
            "버튼은 최대 {BUTTON_COUNT_MAX}개까지 가능합니다 (현재: {}개)",
            template.buttons.len()
        ));
    }
    for (idx, button) in template.buttons.iter().enumerate() {
        let position = idx + 1;
        if button.name.trim().is_empty() {
            return Some(format!("버튼 {position}의 이름은 빈 값일 수 없습니다"));
        }
        if button.name.chars().count() > BUTTON_NAME_MAX {
            return Some(format!(
                "버튼 {position}의 이름이 {BUTTON_NAME_MAX}자를 초과했습니다"
            ));
        }
        match button.kind {
            ButtonKind::WebLink => {
                if button.url_mobile.is_none() && button.url_pc.is_none() {
                    return Some(format!(
                        "웹링크 버튼 {position}은 모바일 URL 또는 PC URL이 필요합니다"
                    ));
                }
            }
            ButtonKind::AppLink => {
                if button.scheme_android.is_none() && button.scheme_ios.is_none() {
                    return Some(format!(
                        "앱링크 버튼 {position}은 안드로이드 또는 iOS 스킴이 필요합니다"
                    ));
                }
            }
            ButtonKind::DeliveryTracking => {}
        }
    }
    None
}

/// Every `#{name}` referenced in the body should exist in the variables map.
fn check_variables(template: &Template) -> Option<String> {
    let missing: Vec<String> = template
        .body_placeholders()
        .into_iter()
        .filter(|name| !template.variables.contains_key(name))
        .collect();
    (!missing.is_empty()).then(|| {
        format!(
            "본문에 선언되지 않은 변수가 있습니다: {}",
            missing.join(", ")
        )
    })
}

fn check_button_urls(template: &Template) -> Option<String> {
    for (idx, button) in template.buttons.iter().enumerate() {
        for url in button_urls(button) {
            if !is_valid_http_url(url) {
                return Some(format!("버튼 {}의 URL이 유효하지 않습니다: {url}", idx + 1));
            }
        }
    }
    None
}

fn check_marketing_disclosure(template: &Template) -> Option<String> {
    if template.is_promotional() && !template.body.contains("(광고)") {
        return Some("마케팅성 메시지에는 '(광고)' 표기가 필요합니다".to_string());
    }
    None
}

fn check_privacy(template: &Template) -> Option<String> {
    let content = template.content();
    PRIVACY_RES
        .iter()
        .any(|re| re.is_match(&content))
        .then(|| "개인정보로 의심되는 패턴이 포함되어 있습니다".to_string())
}

/// URL fields present on a button.
pub(crate) fn button_urls(button: &Button) -> impl Iterator<Item = &str> {
    [button.url_mobile.as_deref(), button.url_pc.as_deref()]
        .into_iter()
        .flatten()
}

/// http(s) URL well-formedness.
pub(crate) fn is_valid_http_url(candidate: &str) -> bool {
    match url::Url::parse(candidate) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notigate_chroma::MemoryVectorStore;
    use notigate_core::template::{Category, Channel};
    use notigate_test_utils::rule_doc;
    use serde_json::Value;
    use std::collections::HashMap;

    fn base_template(body: &str) -> Template {
        Template {
            body: body.to_string(),
            ..Template::default()
        }
    }

    fn store_with_rules(rules: Vec<notigate_core::types::StoredDocument>) -> Arc<MemoryVectorStore> {
        let store = Arc::new(MemoryVectorStore::new());
        store.insert_many(RULES_COLLECTION, rules);
        store
    }

    fn strict_length_rule(max: u64) -> notigate_core::types::StoredDocument {
        rule_doc(
            "len-body",
            "본문은 1000자를 초과할 수 없습니다",
            &[
                ("type", Value::from("constraint")),
                ("category", Value::from("length")),
                ("priority", Value::from("critical")),
                ("enforcement", Value::from("strict")),
                ("max_length", Value::from(max)),
                ("field", Value::from("body")),
            ],
        )
    }

    #[tokio::test]
    async fn over_length_body_fails_with_measured_length() {
        let store = store_with_rules(vec![strict_length_rule(1000)]);
        let validator = ConstraintValidator::new(store);
        let template = base_template(&"x".repeat(1001));

        let result = validator.validate(&template).await;
        assert!(!result.is_valid);
        assert!(
            result.errors.iter().any(|e| e.contains("1000") && e.contains("1001")),
            "error must name limit and measured length: {:?}",
            result.errors
        );
    }

    #[tokio::test]
    async fn compliant_body_passes_length_rule() {
        let store = store_with_rules(vec![strict_length_rule(1000)]);
        let validator = ConstraintValidator::new(store);
        let result = validator.validate(&base_template("주문이 완료되었습니다")).await;
        assert!(result.is_valid, "errors: {:?}", result.errors);
    }

    #[tokio::test]
    async fn flexible_rule_violation_is_warning_not_error() {
        let rule = rule_doc(
            "len-soft",
            "본문은 가급적 100자 이내",
            &[
                ("type", Value::from("rule")),
                ("priority", Value::from("medium")),
                ("enforcement", Value::from("flexible")),
                ("max_length", Value::from(100u64)),
            ],
        );
        let validator = ConstraintValidator::new(store_with_rules(vec![rule]));
        let result = validator.validate(&base_template(&"y".repeat(150))).await;
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[tokio::test]
    async fn forbidden_words_rule_lists_found_words() {
        let rule = rule_doc(
            "words-1",
            "금지 단어",
            &[
                ("type", Value::from("constraint")),
                ("priority", Value::from("high")),
                ("enforcement", Value::from("strict")),
                ("forbidden_words", Value::from("도박,불법대출")),
            ],
        );
        let validator = ConstraintValidator::new(store_with_rules(vec![rule]));
        let result = validator
            .validate(&base_template("불법대출 안내를 드립니다"))
            .await;
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("불법대출"));
    }

    #[tokio::test]
    async fn policy_documents_do_not_participate() {
        let rule = rule_doc(
            "pol-1",
            "마케팅 메시지는 광고 표기가 필요",
            &[
                ("type", Value::from("policy")),
                ("category", Value::from("marketing")),
                ("priority", Value::from("critical")),
                ("enforcement", Value::from("strict")),
            ],
        );
        let validator = ConstraintValidator::new(store_with_rules(vec![rule]));
        let mut template = base_template("할인 이벤트 안내");
        template.category = Some(Category::Marketing);
        let result = validator.validate(&template).await;
        assert!(result.is_valid, "policy docs belong to the semantic gate");
    }

    #[tokio::test]
    async fn marketing_heuristic_requires_disclosure() {
        let rule = rule_doc(
            "mkt-1",
            "마케팅 메시지는 (광고) 표기가 필요합니다",
            &[
                ("type", Value::from("rule")),
                ("category", Value::from("marketing")),
                ("priority", Value::from("critical")),
                ("enforcement", Value::from("strict")),
            ],
        );
        let validator = ConstraintValidator::new(store_with_rules(vec![rule]));
        let mut template = base_template("특가 세일을 놓치지 마세요");
        template.category = Some(Category::Marketing);
        let result = validator.validate(&template).await;
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("(광고)"));
    }

    #[tokio::test]
    async fn length_heuristic_reads_limit_from_rule_text() {
        let rule = rule_doc(
            "len-heuristic",
            "본문은 500자를 초과할 수 없습니다",
            &[
                ("type", Value::from("constraint")),
                ("category", Value::from("length")),
                ("priority", Value::from("high")),
                ("enforcement", Value::from("strict")),
            ],
        );
        let validator = ConstraintValidator::new(store_with_rules(vec![rule]));
        let result = validator.validate(&base_template(&"z".repeat(501))).await;
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("500"));
    }

    #[tokio::test]
    async fn variable_heuristic_flags_undeclared_placeholders() {
        let rule = rule_doc(
            "var-1",
            "본문 변수는 변수 목록에 선언되어야 합니다",
            &[
                ("type", Value::from("rule")),
                ("category", Value::from("variable")),
            ],
        );
        let validator = ConstraintValidator::new(store_with_rules(vec![rule]));
        let mut template = base_template("#{name}님, #{order_id} 주문 안내");
        template.variables = HashMap::from([("name".to_string(), "홍길동".to_string())]);
        let result = validator.validate(&template).await;
        // Default priority/enforcement makes this a warning, per the data
        // model: a dangling placeholder is not always an error.
        assert!(result.is_valid);
        assert!(result.warnings[0].contains("order_id"));
    }

    #[tokio::test]
    async fn button_heuristic_checks_kind_specific_fields() {
        let rule = rule_doc(
            "btn-1",
            "버튼 형식 제약",
            &[
                ("type", Value::from("constraint")),
                ("category", Value::from("button")),
                ("priority", Value::from("high")),
                ("enforcement", Value::from("strict")),
            ],
        );
        let validator = ConstraintValidator::new(store_with_rules(vec![rule]));
        let mut template = base_template("주문 안내");
        template.buttons = vec![Button {
            name: "자세히 보기".into(),
            kind: ButtonKind::WebLink,
            ..Button::default()
        }];
        let result = validator.validate(&template).await;
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("웹링크"));
    }

    #[tokio::test]
    async fn absolute_invariants_survive_store_failure() {
        struct BrokenStore;

        #[async_trait::async_trait]
        impl VectorStore for BrokenStore {
            async fn search(
                &self,
                _c: &str,
                _q: &str,
                _f: Option<&HashMap<String, String>>,
                _k: usize,
            ) -> Result<Vec<notigate_core::types::ScoredDocument>, notigate_core::NotigateError>
            {
                Err(notigate_core::NotigateError::store("down"))
            }
            async fn list_all(
                &self,
                _c: &str,
            ) -> Result<Vec<notigate_core::types::StoredDocument>, notigate_core::NotigateError>
            {
                Err(notigate_core::NotigateError::store("down"))
            }
        }

        let validator = ConstraintValidator::new(Arc::new(BrokenStore));
        let result = validator.validate(&base_template(&"a".repeat(2001))).await;
        assert!(!result.is_valid, "absolute body limit must hold without rules");
        assert!(result.errors[0].contains("2000"));
        assert!(
            result.warnings.iter().any(|w| w.contains("규칙 조회 실패")),
            "store failure surfaces as a warning"
        );
    }

    #[tokio::test]
    async fn absolute_button_ceiling_is_unconditional() {
        let validator = ConstraintValidator::new(Arc::new(MemoryVectorStore::new()));
        let mut template = base_template("버튼이 아주 많은 메시지");
        template.buttons = (0..11)
            .map(|i| Button {
                name: format!("버튼{i}"),
                kind: ButtonKind::DeliveryTracking,
                ..Button::default()
            })
            .collect();
        let result = validator.validate(&template).await;
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("10"));
    }

    #[tokio::test]
    async fn blank_body_is_rejected() {
        let validator = ConstraintValidator::new(Arc::new(MemoryVectorStore::new()));
        let result = validator.validate(&base_template("   ")).await;
        assert!(!result.is_valid);
    }

    #[test]
    fn url_validity_accepts_http_and_rejects_junk() {
        assert!(is_valid_http_url("https://example.com/track?id=1"));
        assert!(is_valid_http_url("http://localhost:8080/"));
        assert!(!is_valid_http_url("ftp://example.com"));
        assert!(!is_valid_http_url("자세히 보기"));
        assert!(!is_valid_http_url("https://"));
    }

    #[test]
    fn promotional_broadcast_channel_needs_disclosure_too() {
        let template = Template {
            channel: Channel::BroadcastChannel,
            body: "신상품 출시 안내".into(),
            ..Template::default()
        };
        assert!(check_marketing_disclosure(&template).is_some());
    }
}
