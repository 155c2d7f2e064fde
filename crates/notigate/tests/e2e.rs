// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over the assembled service: seeded in-memory corpus,
//! scripted model, both entry points.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use notigate::Service;
use notigate_chroma::MemoryVectorStore;
use notigate_config::NotigateConfig;
use notigate_core::NotigateError;
use notigate_core::template::{
    Category, Channel, GenerationMethod, GenerationRequest, Template, ValidationStage,
};
use notigate_core::types::{APPROVED_COLLECTION, ChatMessage, RULES_COLLECTION};
use notigate_test_utils::{MockModel, approved_template_doc, rule_doc};

fn passing_verdict() -> String {
    r#"{"passed": true, "summary": "통과", "violations": [],
        "autofix": {"enabled": false, "patch_body": "", "notes": ""},
        "policy_refs": []}"#
        .to_string()
}

fn seeded_store() -> Arc<MemoryVectorStore> {
    let store = Arc::new(MemoryVectorStore::new());
    store.insert(
        RULES_COLLECTION,
        rule_doc(
            "len-body",
            "본문은 1000자를 초과할 수 없습니다",
            &[
                ("type", Value::from("constraint")),
                ("category", Value::from("length")),
                ("priority", Value::from("critical")),
                ("enforcement", Value::from("strict")),
                ("max_length", Value::from(1000)),
                ("field", Value::from("body")),
            ],
        ),
    );
    store.insert(
        APPROVED_COLLECTION,
        approved_template_doc(
            "apv-1",
            "고객님의 주문 이 정상적으로 접수 되었습니다",
            "주문",
            "주문/예약",
        ),
    );
    store
}

fn service_with(model: MockModel, store: Arc<MemoryVectorStore>) -> Service {
    Service::new(Arc::new(model), store, &NotigateConfig::default())
}

fn transactional(body: &str) -> Template {
    Template {
        channel: Channel::PrimaryChannel,
        category: Some(Category::Transaction),
        body: body.to_string(),
        ..Template::default()
    }
}

#[tokio::test]
async fn valid_template_passes_both_gates() {
    let model = MockModel::with_responses(vec![passing_verdict()]);
    let service = service_with(model, seeded_store());

    let outcome = service
        .validate(&transactional("고객님의 주문이 완료되었습니다"))
        .await
        .unwrap();
    assert!(outcome.final_result.is_valid, "errors: {:?}", outcome.final_result.errors);
    assert_eq!(outcome.final_result.stage, ValidationStage::Final);
}

#[tokio::test]
async fn over_length_body_is_rejected_at_the_constraint_gate() {
    let service = service_with(MockModel::new(), seeded_store());

    let outcome = service
        .validate(&transactional(&"x".repeat(1001)))
        .await
        .unwrap();
    assert!(!outcome.final_result.is_valid);
    assert_eq!(outcome.final_result.stage, ValidationStage::Constraint);
    assert!(
        outcome
            .final_result
            .errors
            .iter()
            .any(|e| e.contains("1000") && e.contains("1001"))
    );
    assert!(outcome.semantic.is_none());
}

#[tokio::test]
async fn marketing_without_disclosure_is_rejected_at_the_semantic_gate() {
    let model = MockModel::with_responses(vec![passing_verdict()]);
    let service = service_with(model, seeded_store());

    let mut template = transactional("오늘 하루만 전 품목 특가 세일!");
    template.category = Some(Category::Marketing);
    let outcome = service.validate(&template).await.unwrap();
    assert!(!outcome.final_result.is_valid);
    assert_eq!(outcome.final_result.stage, ValidationStage::Semantic);
    assert!(
        outcome
            .final_result
            .errors
            .iter()
            .any(|e| e.contains("(광고)"))
    );
}

#[tokio::test]
async fn generation_uses_approved_reference_when_similar() {
    let model = MockModel::with_responses(vec![
        r#"{"type": "BASIC", "has_channel_link": false, "has_extra_info": false}"#.to_string(),
        r#"{"category_sub": "주문/예약", "explanation": ""}"#.to_string(),
        "#{name}님의 주문 이 정상적으로 접수 되었습니다. 주문번호: #{order_id}".to_string(),
        "주문 접수".to_string(),
    ]);
    let service = service_with(model, seeded_store());

    let result = service
        .generate(&GenerationRequest {
            // Near-identical to the seeded approved template so the
            // token-overlap similarity clears the 0.7 gate.
            user_text: "고객님의 주문 이 정상적으로 접수 되었습니다".into(),
            category_main: "주문".into(),
            category_sub_candidates: vec!["주문/예약".to_string(), "배송상태".to_string()],
            model: None,
        })
        .await
        .unwrap();

    assert_eq!(result.generation_method, GenerationMethod::ReferenceBased);
    assert_eq!(result.reference_ids, vec!["apv-1".to_string()]);
    assert_eq!(
        result.variables_detected,
        vec!["name".to_string(), "order_id".to_string()]
    );
    assert!(result.template_title.chars().count() <= 10);
}

#[tokio::test]
async fn generation_total_failure_reports_failed_method() {
    let model = MockModel::new();
    model
        .push_response(r#"{"type": "BASIC", "has_channel_link": false, "has_extra_info": false}"#)
        .await;
    model
        .push_response(r#"{"category_sub": "기타", "explanation": ""}"#)
        .await;
    model.push_failure("generation backend down").await;
    // Empty store: no references, no guidelines, so the chain ends at
    // new_creation, whose failure is terminal.
    let service = service_with(model, Arc::new(MemoryVectorStore::new()));

    let result = service
        .generate(&GenerationRequest {
            user_text: "회원가입을 환영합니다".into(),
            category_main: "회원".into(),
            category_sub_candidates: vec!["기타".to_string()],
            model: None,
        })
        .await
        .unwrap();
    assert_eq!(result.generation_method, GenerationMethod::Failed);
    assert!(result.error_message.is_some());
}

#[tokio::test(start_paused = true)]
async fn pipeline_timeout_surfaces_as_timeout_error() {
    /// A model that never answers.
    struct HangingModel;

    #[async_trait::async_trait]
    impl notigate_core::traits::LanguageModel for HangingModel {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _model: Option<&str>,
        ) -> Result<String, NotigateError> {
            std::future::pending().await
        }
    }

    let service = Service::new(
        Arc::new(HangingModel),
        Arc::new(MemoryVectorStore::new()),
        &NotigateConfig::default(),
    );

    let err = service
        .validate(&transactional("주문이 완료되었습니다"))
        .await
        .unwrap_err();
    assert!(matches!(err, NotigateError::Timeout { .. }));
}
