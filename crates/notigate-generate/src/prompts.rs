// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt builders for the three generation strategies and title creation.
//!
//! Every body-generation prompt carries the same base rules: `#{name}`
//! variable syntax, no advertising copy in informational messages, the
//! disclosure line policy for promotional ones, and -- explicitly -- never
//! enumerating variable definitions inside the output body.

use notigate_core::template::RetrievedCandidate;
use notigate_core::types::ChatMessage;

/// Rules shared by every generation strategy.
const GENERATION_RULES: &str = "생성 규칙:\n\
    - 수신자마다 달라지는 값은 #{변수명} 형식으로 표현한다.\n\
    - 정보성/안내성 요청에는 광고 문구를 넣지 않는다.\n\
    - 광고성 메시지라면 본문 첫머리에 (광고) 표기를 넣는다.\n\
    - 본문 텍스트만 출력한다. 변수 정의 목록이나 설명을 본문에 나열하지 않는다.";

/// Reference-based generation: approved templates as structural references.
pub fn reference_prompt(user_text: &str, references: &[RetrievedCandidate]) -> Vec<ChatMessage> {
    let mut reference_text = String::new();
    for reference in references {
        reference_text.push_str(&format!("[참고 {}]\n{}\n\n", reference.rank, reference.text));
    }
    vec![
        ChatMessage::system(format!(
            "너는 비즈니스 알림 템플릿 생성 전문가다. 승인받은 참고 템플릿의 구조와 문체를 따라, \
             사용자 요청에 맞는 새 템플릿을 생성한다.\n\n{GENERATION_RULES}\n\n참고 템플릿:\n{reference_text}"
        )),
        ChatMessage::user(format!("사용자 요청:\n{user_text}")),
    ]
}

/// Policy-guided generation: guideline excerpts instead of references.
pub fn policy_prompt(user_text: &str, guidelines: &[RetrievedCandidate]) -> Vec<ChatMessage> {
    let guideline_text = guidelines
        .iter()
        .map(|g| format!("- {}", g.text))
        .collect::<Vec<_>>()
        .join("\n");
    vec![
        ChatMessage::system(format!(
            "너는 비즈니스 알림 정책 전문가다. 아래 정책 가이드라인을 완벽히 준수하는 템플릿만 생성한다.\n\n\
             {GENERATION_RULES}\n\n정책 가이드라인:\n{guideline_text}"
        )),
        ChatMessage::user(format!("사용자 요청:\n{user_text}")),
    ]
}

/// New creation: only the rules and the raw request.
pub fn new_creation_prompt(user_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "너는 비즈니스 알림 템플릿 생성 전문가다. 채널 규정에 맞는 정보성/안내성 템플릿을 생성한다.\n\n\
             {GENERATION_RULES}"
        )),
        ChatMessage::user(format!("사용자 요청:\n{user_text}")),
    ]
}

/// Title generation from the produced body.
pub fn title_prompt(body: &str, max_chars: usize) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "주어진 본문을 기반으로 {max_chars}자 이내의 간결한 제목을 생성한다. 제목만 출력한다."
        )),
        ChatMessage::user(body.to_string()),
    ]
}
