// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule document model: structured policy statements with enforcement
//! metadata, parsed leniently from vector store documents.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::StoredDocument;

/// What kind of statement a rule document carries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Constraint,
    Rule,
    Policy,
    Recommendation,
}

/// Priority assigned to a rule by the policy authors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RulePriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Whether a rule is enforced strictly or flexibly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RuleEnforcement {
    Strict,
    Flexible,
}

/// A rule/guideline document with its enforcement metadata.
///
/// Reference data: loaded into the vector store out-of-band and treated as
/// immutable during request processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub id: String,
    pub content: String,
    pub kind: Option<RuleKind>,
    pub category: Option<String>,
    pub priority: RulePriority,
    pub enforcement: RuleEnforcement,
    /// Exact-check fields; present only on schema-style constraint rules.
    pub max_length: Option<usize>,
    pub field: Option<String>,
    pub forbidden_words: Vec<String>,
    pub max_buttons: Option<usize>,
    pub required_fields: Vec<String>,
}

impl RuleDocument {
    /// Parse a rule from a stored document.
    ///
    /// Metadata is authored by hand, so parsing is lenient: unknown or
    /// missing priority defaults to medium, enforcement to flexible, and
    /// list-valued fields accept comma-separated strings (store metadata is
    /// scalar-only).
    pub fn from_document(doc: &StoredDocument) -> Self {
        let kind = doc
            .meta_str("type")
            .and_then(|s| RuleKind::from_str(&s.to_lowercase()).ok());
        let priority = doc
            .meta_str("priority")
            .and_then(|s| RulePriority::from_str(&s.to_lowercase()).ok())
            .unwrap_or(RulePriority::Medium);
        let enforcement = doc
            .meta_str("enforcement")
            .and_then(|s| RuleEnforcement::from_str(&s.to_lowercase()).ok())
            .unwrap_or(RuleEnforcement::Flexible);

        Self {
            id: doc.id.clone(),
            content: doc.text.clone(),
            kind,
            category: doc.meta_str("category").map(str::to_string),
            priority,
            enforcement,
            max_length: doc.meta_u64("max_length").map(|n| n as usize),
            field: doc.meta_str("field").map(str::to_string),
            forbidden_words: split_list(doc.meta_str("forbidden_words")),
            max_buttons: doc.meta_u64("max_buttons").map(|n| n as usize),
            required_fields: split_list(doc.meta_str("required_fields")),
        }
    }

    /// Whether this rule participates in the deterministic constraint gate.
    pub fn is_constraint(&self) -> bool {
        matches!(self.kind, Some(RuleKind::Constraint) | Some(RuleKind::Rule))
    }

    /// A violation of this rule is an error only when the rule is both
    /// high-priority and strictly enforced; everything else is a warning.
    pub fn violation_is_error(&self) -> bool {
        self.priority >= RulePriority::High && self.enforcement == RuleEnforcement::Strict
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};

    fn doc_with(metadata: &[(&str, Value)]) -> StoredDocument {
        let mut map = Map::new();
        for (k, v) in metadata {
            map.insert((*k).to_string(), v.clone());
        }
        StoredDocument {
            id: "rule-1".into(),
            text: "본문은 1000자를 초과할 수 없습니다".into(),
            metadata: map,
        }
    }

    #[test]
    fn parses_full_metadata() {
        let doc = doc_with(&[
            ("type", Value::from("constraint")),
            ("category", Value::from("length")),
            ("priority", Value::from("critical")),
            ("enforcement", Value::from("strict")),
            ("max_length", Value::from(1000)),
            ("field", Value::from("body")),
        ]);
        let rule = RuleDocument::from_document(&doc);
        assert_eq!(rule.kind, Some(RuleKind::Constraint));
        assert_eq!(rule.priority, RulePriority::Critical);
        assert_eq!(rule.enforcement, RuleEnforcement::Strict);
        assert_eq!(rule.max_length, Some(1000));
        assert_eq!(rule.field.as_deref(), Some("body"));
        assert!(rule.is_constraint());
        assert!(rule.violation_is_error());
    }

    #[test]
    fn sparse_metadata_falls_back_to_defaults() {
        let doc = doc_with(&[("type", Value::from("rule"))]);
        let rule = RuleDocument::from_document(&doc);
        assert_eq!(rule.priority, RulePriority::Medium);
        assert_eq!(rule.enforcement, RuleEnforcement::Flexible);
        assert!(!rule.violation_is_error());
    }

    #[test]
    fn high_priority_flexible_is_still_warning() {
        let doc = doc_with(&[
            ("type", Value::from("constraint")),
            ("priority", Value::from("high")),
            ("enforcement", Value::from("flexible")),
        ]);
        assert!(!RuleDocument::from_document(&doc).violation_is_error());
    }

    #[test]
    fn policy_documents_are_not_constraints() {
        let doc = doc_with(&[("type", Value::from("policy"))]);
        assert!(!RuleDocument::from_document(&doc).is_constraint());
        let untyped = doc_with(&[]);
        assert!(!RuleDocument::from_document(&untyped).is_constraint());
    }

    #[test]
    fn comma_separated_lists_are_split_and_trimmed() {
        let doc = doc_with(&[(
            "forbidden_words",
            Value::from("도박, 사행성 , 불법대출"),
        )]);
        let rule = RuleDocument::from_document(&doc);
        assert_eq!(rule.forbidden_words, vec!["도박", "사행성", "불법대출"]);
    }
}
