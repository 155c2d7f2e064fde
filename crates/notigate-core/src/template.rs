// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model: templates, validation results, generation requests/results.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Matches `#{name}` variable placeholders in template text.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\{([^}]+)\}").expect("placeholder regex"));

/// Channel a template is addressed to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    /// Transactional notification channel (opt-in, informational).
    PrimaryChannel,
    /// Broadcast channel; messages are treated as promotional.
    BroadcastChannel,
}

/// Content category assigned to a template.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Transaction,
    Marketing,
    Mixed,
    NeedsReview,
}

/// Kind of an attached button.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ButtonKind {
    WebLink,
    AppLink,
    DeliveryTracking,
}

/// A button attached to a template.
///
/// WebLink buttons carry URLs, AppLink buttons carry app schemes; the
/// type-specific requirements are enforced by the constraint validator, not
/// at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub name: String,
    pub kind: ButtonKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_pc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_android: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_ios: Option<String>,
}

impl Default for ButtonKind {
    fn default() -> Self {
        ButtonKind::WebLink
    }
}

/// A business notification template.
///
/// Immutable once validated: the pipeline never mutates a submitted
/// template, and generated templates are constructed whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub channel: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default)]
    pub buttons: Vec<Button>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Default for Channel {
    fn default() -> Self {
        Channel::PrimaryChannel
    }
}

impl Template {
    /// Title and body joined for content-level checks and searches.
    pub fn content(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => format!("{title} {}", self.body),
            _ => self.body.clone(),
        }
    }

    /// Variable names referenced in the body, first appearance order,
    /// duplicates removed.
    pub fn body_placeholders(&self) -> Vec<String> {
        extract_placeholders(&self.body)
    }

    /// Whether this template is promotional: explicitly categorized as
    /// marketing, or addressed to the broadcast channel.
    pub fn is_promotional(&self) -> bool {
        self.category == Some(Category::Marketing) || self.channel == Channel::BroadcastChannel
    }
}

/// Extract `#{name}` placeholder names from text, first appearance order,
/// duplicates removed.
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let name = caps[1].to_string();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Substitute `#{name}` placeholders in `text` using `variables`.
///
/// Unknown placeholders are left intact so the caller can report them.
pub fn render_placeholders(text: &str, variables: &HashMap<String, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            variables
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Which gate produced a validation result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ValidationStage {
    Constraint,
    Semantic,
    Final,
}

/// Outcome of one validation stage (or the merged final outcome).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub stage: ValidationStage,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl ValidationResult {
    /// An empty, passing result for the given stage.
    pub fn passing(stage: ValidationStage) -> Self {
        Self {
            stage,
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            details: Map::new(),
        }
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    pub fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn insert_detail(&mut self, key: impl Into<String>, value: Value) {
        self.details.insert(key.into(), value);
    }

    /// Merge another stage's errors and warnings into this result.
    pub fn absorb(&mut self, other: &ValidationResult) {
        self.errors.extend(other.errors.iter().cloned());
        self.warnings.extend(other.warnings.iter().cloned());
        self.is_valid = self.errors.is_empty();
    }
}

/// A candidate returned by the retrieval engine. Transient, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedCandidate {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Similarity in [0, 1]; 1 is an exact match.
    pub similarity: f32,
    /// 1-based position in the original search ordering.
    pub rank: usize,
}

/// Request to generate a template from free-form user text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub user_text: String,
    pub category_main: String,
    /// Closed list of sub-category candidates the classifier selects from.
    pub category_sub_candidates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Strategy that produced a generated template.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    /// Generated against approved templates retrieved above the similarity
    /// threshold.
    ReferenceBased,
    /// Generated against policy guideline excerpts.
    PolicyGuided,
    /// Generated from rules and the raw request only.
    NewCreation,
    /// Every strategy failed.
    Failed,
}

/// Result of a generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub template_text: String,
    pub template_title: String,
    pub variables_detected: Vec<String>,
    pub generation_method: GenerationMethod,
    pub reference_ids: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl GenerationResult {
    /// A terminal failure result carrying an operator-readable message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            template_text: String::new(),
            template_title: String::new(),
            variables_detected: Vec::new(),
            generation_method: GenerationMethod::Failed,
            reference_ids: Vec::new(),
            metadata: Map::new(),
            error_message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_preserve_first_appearance_order() {
        let vars = extract_placeholders("#{name}님, #{date}에 #{name} 앞으로 도착합니다");
        assert_eq!(vars, vec!["name".to_string(), "date".to_string()]);
    }

    #[test]
    fn render_substitutes_known_and_keeps_unknown() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "김철수".to_string());
        let rendered = render_placeholders("#{name}님의 주문 #{order_id}", &vars);
        assert_eq!(rendered, "김철수님의 주문 #{order_id}");
    }

    #[test]
    fn content_joins_title_and_body() {
        let template = Template {
            title: Some("주문 안내".into()),
            body: "주문이 완료되었습니다".into(),
            ..Template::default()
        };
        assert_eq!(template.content(), "주문 안내 주문이 완료되었습니다");

        let untitled = Template {
            body: "주문이 완료되었습니다".into(),
            ..Template::default()
        };
        assert_eq!(untitled.content(), "주문이 완료되었습니다");
    }

    #[test]
    fn broadcast_channel_is_promotional() {
        let template = Template {
            channel: Channel::BroadcastChannel,
            body: "이벤트 안내".into(),
            ..Template::default()
        };
        assert!(template.is_promotional());

        let transactional = Template {
            channel: Channel::PrimaryChannel,
            category: Some(Category::Transaction),
            body: "주문 완료".into(),
            ..Template::default()
        };
        assert!(!transactional.is_promotional());
    }

    #[test]
    fn push_error_flips_validity() {
        let mut result = ValidationResult::passing(ValidationStage::Constraint);
        assert!(result.is_valid);
        result.push_warning("minor note");
        assert!(result.is_valid);
        result.push_error("hard violation");
        assert!(!result.is_valid);
    }

    #[test]
    fn absorb_unions_errors_and_warnings() {
        let mut first = ValidationResult::passing(ValidationStage::Final);
        let mut second = ValidationResult::passing(ValidationStage::Semantic);
        second.push_warning("w1");
        second.push_error("e1");
        first.absorb(&second);
        assert_eq!(first.errors, vec!["e1".to_string()]);
        assert_eq!(first.warnings, vec!["w1".to_string()]);
        assert!(!first.is_valid);
    }

    #[test]
    fn generation_method_serializes_snake_case() {
        let json = serde_json::to_value(GenerationMethod::ReferenceBased).unwrap();
        assert_eq!(json, "reference_based");
        assert_eq!(GenerationMethod::Failed.to_string(), "failed");
    }

    #[test]
    fn template_round_trips_through_json() {
        let template = Template {
            id: Some("tpl-1".into()),
            channel: Channel::PrimaryChannel,
            title: Some("배송 안내".into()),
            body: "#{name}님, 상품이 발송되었습니다".into(),
            variables: HashMap::from([("name".to_string(), "홍길동".to_string())]),
            buttons: vec![Button {
                name: "배송조회".into(),
                kind: ButtonKind::DeliveryTracking,
                ..Button::default()
            }],
            category: Some(Category::Transaction),
        };
        let json = serde_json::to_string(&template).unwrap();
        let back: Template = serde_json::from_str(&json).unwrap();
        assert_eq!(back, template);
        assert!(json.contains("\"primary-channel\""));
        assert!(json.contains("\"delivery-tracking\""));
    }
}
