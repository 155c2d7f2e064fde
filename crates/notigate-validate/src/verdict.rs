// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Final adjudication gate: prompt, verdict schema, and the pass rule.
//!
//! The model's own `passed` claim is never trusted -- the pass rule is
//! recomputed locally from the violation list so it stays enforceable.

use serde::{Deserialize, Serialize};
use serde_json::json;

use notigate_core::NotigateError;
use notigate_core::template::{RetrievedCandidate, Template, ValidationResult};
use notigate_core::types::ChatMessage;

/// Severity of an adjudicated violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

/// One violation named by the adjudicator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerdictViolation {
    pub rule_id: String,
    pub severity: Severity,
    #[serde(default)]
    pub evidence: String,
    #[serde(default)]
    pub policy_ref: Option<String>,
    /// Character span `[start, end)` in the template body, when the model
    /// can localize the violation.
    #[serde(default)]
    pub span: Option<(usize, usize)>,
}

/// Suggested automatic fix. Never applied; surfaced as a warning.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Autofix {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub patch_body: String,
    #[serde(default)]
    pub notes: String,
}

/// The adjudicator's structured reply.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Verdict {
    /// The model's own claim; informational only. See [`verdict_passes`].
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub violations: Vec<VerdictViolation>,
    #[serde(default)]
    pub autofix: Autofix,
    #[serde(default)]
    pub policy_refs: Vec<String>,
}

/// Pass rule: no critical violations and at most one major one.
pub fn verdict_passes(violations: &[VerdictViolation]) -> bool {
    let critical = violations
        .iter()
        .filter(|v| v.severity == Severity::Critical)
        .count();
    let major = violations
        .iter()
        .filter(|v| v.severity == Severity::Major)
        .count();
    critical == 0 && major <= 1
}

/// Parse an adjudication reply, tolerating surrounding prose.
pub fn parse_verdict(reply: &str) -> Result<Verdict, NotigateError> {
    let trimmed = reply.trim();
    let start = trimmed.find('{').unwrap_or(0);
    let end = trimmed.rfind('}').map(|i| i + 1).unwrap_or(trimmed.len());
    let json_str = &trimmed[start..end.max(start)];
    serde_json::from_str(json_str).map_err(|e| NotigateError::parse(format!("{e}: {reply}")))
}

/// Build the adjudication prompt: the template, the constraint-stage
/// summary, and the retrieved policy excerpts, with the output schema and
/// pass rule spelled out.
pub fn adjudication_prompt(
    template: &Template,
    constraint: Option<&ValidationResult>,
    excerpts: &[RetrievedCandidate],
) -> Vec<ChatMessage> {
    let summary = json!({
        "constraint_passed": constraint.map(|c| c.is_valid).unwrap_or(true),
        "issues_found": constraint.map(|c| c.errors.clone()).unwrap_or_default(),
        "warnings": constraint.map(|c| c.warnings.clone()).unwrap_or_default(),
    });

    let mut excerpt_text = String::new();
    for excerpt in excerpts {
        excerpt_text.push_str(&format!(
            "- [{}] (유사도 {:.2}) {}\n",
            excerpt.id, excerpt.similarity, excerpt.text
        ));
    }
    if excerpt_text.is_empty() {
        excerpt_text.push_str("(관련 정책 문서 없음)\n");
    }

    let template_json =
        serde_json::to_string_pretty(template).unwrap_or_else(|_| "{}".to_string());

    let user = format!(
        "# 검증 대상 템플릿(JSON)\n{template_json}\n\n\
         # 제약 검사 요약\n{summary}\n\n\
         # 정책/가이드 컨텍스트 (RAG Top-K)\n{excerpt_text}\n\
         # 평가 기준\n\
         - CRITICAL 0건 AND MAJOR 1건 이하이면 passed=true, 그 외 false.\n\n\
         # 출력 스키마(JSON만 출력)\n\
         {{\"passed\": boolean, \"summary\": \"string\",\n\
          \"violations\": [{{\"rule_id\": \"string\", \"severity\": \"CRITICAL|MAJOR|MINOR\",\n\
            \"evidence\": \"string\", \"policy_ref\": \"string\", \"span\": [start, end]}}],\n\
          \"autofix\": {{\"enabled\": boolean, \"patch_body\": \"string\", \"notes\": \"string\"}},\n\
          \"policy_refs\": [\"string\"]}}"
    );

    vec![
        ChatMessage::system(
            "너는 비즈니스 알림 템플릿의 최종 검증 담당자다.\n\
             - 제약 검사 요약과 정책 컨텍스트(RAG 문서)가 함께 제공된다.\n\
             - 결과는 출력 스키마의 JSON만 반환한다. 설명이나 마크업을 덧붙이지 않는다.\n\
             - 가능한 경우 자동 수정(autofix.patch_body)을 제안하되, 원문의 의미는 유지한다.",
        ),
        ChatMessage::user(user),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn violation(severity: Severity) -> VerdictViolation {
        VerdictViolation {
            rule_id: "rule".into(),
            severity,
            evidence: String::new(),
            policy_ref: None,
            span: None,
        }
    }

    #[test]
    fn pass_rule_boundaries() {
        assert!(verdict_passes(&[]));
        assert!(verdict_passes(&[violation(Severity::Major)]));
        assert!(verdict_passes(&[violation(Severity::Minor), violation(Severity::Minor)]));
        assert!(!verdict_passes(&[violation(Severity::Major), violation(Severity::Major)]));
        assert!(!verdict_passes(&[violation(Severity::Critical)]));
        assert!(!verdict_passes(&[
            violation(Severity::Critical),
            violation(Severity::Minor)
        ]));
    }

    proptest! {
        #[test]
        fn pass_rule_matches_counts(criticals in 0usize..4, majors in 0usize..4, minors in 0usize..4) {
            let mut violations = Vec::new();
            violations.extend((0..criticals).map(|_| violation(Severity::Critical)));
            violations.extend((0..majors).map(|_| violation(Severity::Major)));
            violations.extend((0..minors).map(|_| violation(Severity::Minor)));

            let expected = criticals == 0 && majors <= 1;
            prop_assert_eq!(verdict_passes(&violations), expected);
        }
    }

    #[test]
    fn parse_verdict_accepts_full_schema() {
        let reply = r#"{
            "passed": false,
            "summary": "광고 표기 누락",
            "violations": [{
                "rule_id": "ad-disclosure",
                "severity": "CRITICAL",
                "evidence": "본문에 (광고) 표기가 없음",
                "policy_ref": "policy-12",
                "span": [0, 24]
            }],
            "autofix": {"enabled": true, "patch_body": "(광고) ...", "notes": "광고 표기 추가"},
            "policy_refs": ["policy-12"]
        }"#;
        let verdict = parse_verdict(reply).unwrap();
        assert_eq!(verdict.violations.len(), 1);
        assert_eq!(verdict.violations[0].severity, Severity::Critical);
        assert_eq!(verdict.violations[0].span, Some((0, 24)));
        assert!(verdict.autofix.enabled);
    }

    #[test]
    fn parse_verdict_defaults_missing_fields() {
        let verdict = parse_verdict(r#"{"passed": true}"#).unwrap();
        assert!(verdict.violations.is_empty());
        assert!(!verdict.autofix.enabled);
    }

    #[test]
    fn parse_verdict_rejects_prose() {
        assert!(parse_verdict("검증 결과 통과입니다").is_err());
    }

    #[test]
    fn severity_deserializes_uppercase() {
        let severity: Severity = serde_json::from_str("\"MAJOR\"").unwrap();
        assert_eq!(severity, Severity::Major);
    }

    #[test]
    fn prompt_contains_template_and_excerpts() {
        let template = Template {
            body: "주문이 완료되었습니다".into(),
            ..Template::default()
        };
        let excerpts = vec![RetrievedCandidate {
            id: "policy-1".into(),
            text: "정보성 메시지에는 광고 문구를 넣지 않는다".into(),
            metadata: Default::default(),
            similarity: 0.91,
            rank: 1,
        }];
        let messages = adjudication_prompt(&template, None, &excerpts);
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.contains("주문이 완료되었습니다"));
        assert!(messages[1].content.contains("policy-1"));
        assert!(messages[1].content.contains("CRITICAL|MAJOR|MINOR"));
    }
}
