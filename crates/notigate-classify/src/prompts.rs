// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt builders for the three analysis calls.
//!
//! Each builder assembles a system instruction, optional hint messages, and
//! the user text. Hints are injected as additional system messages so an
//! earlier step's result can sharpen a later one.

use notigate_core::types::ChatMessage;

/// Few-shot instruction for message-type classification.
const TYPE_SYSTEM_PROMPT: &str = r#"너는 비즈니스 알림 메시지의 유형을 판정하는 분류기다.
본문에서 두 가지 속성을 판단하라.
- has_channel_link: 채널 추가/친구 추가를 유도하는 문구가 있는가
- has_extra_info: 핵심 알림 외의 부가 설명(혜택 안내, 상세 설명 등)이 있는가

유형 규칙: 둘 다 true -> HYBRID, 채널만 -> CHANNEL_ADD, 부가 설명만 -> EXTRA_INFO, 둘 다 false -> BASIC.

예시 1: "주문이 접수되었습니다. 주문번호: #{order_id}"
-> {"type": "BASIC", "has_channel_link": false, "has_extra_info": false, "explanation": "기본 정보만 포함"}

예시 2: "예약이 확정되었습니다. 채널을 추가하면 예약 변경 알림을 받을 수 있습니다."
-> {"type": "CHANNEL_ADD", "has_channel_link": true, "has_extra_info": false, "explanation": "채널 추가 유도 포함"}

예시 3: "상품이 발송되었습니다. 배송 조회는 평일 기준 1~2일 후 가능하며, 부재 시 경비실에 보관됩니다."
-> {"type": "EXTRA_INFO", "has_channel_link": false, "has_extra_info": true, "explanation": "배송 부가 설명 포함"}

JSON 한 개만 출력하라. 설명 문장이나 마크업을 덧붙이지 마라."#;

/// Instruction for field extraction.
const FIELDS_SYSTEM_PROMPT: &str = r#"너는 비즈니스 알림 메시지에서 구조화 필드를 추출한다.
- intent_type: 메시지 의도 (예: 정보성, 안내성)
- recipient_scope: 수신 대상 (예: 전체회원, 주문고객)
- links_allowed: 링크 포함이 적절한가 (boolean)
- variables: 치환 변수 이름 목록. #{이름} 형태의 명시적 변수와, 이름/날짜/금액/전화번호처럼
  수신자마다 달라지는 자연어 구간을 모두 변수로 본다.

JSON 한 개만 출력하라: {"intent_type": "...", "recipient_scope": "...", "links_allowed": true, "variables": ["..."]}"#;

/// Builds prompt message lists with optional hint injection.
pub struct PromptBuilder {
    system: String,
    hints: Vec<String>,
    user: String,
}

impl PromptBuilder {
    fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            hints: Vec::new(),
            user: user.into(),
        }
    }

    /// Add a hint, injected as an extra system message.
    pub fn add_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Assemble the final message list.
    pub fn build(self) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.system)];
        messages.extend(self.hints.into_iter().map(ChatMessage::system));
        messages.push(ChatMessage::user(self.user));
        messages
    }
}

/// Prompt for message-type classification.
pub fn type_prompt(user_text: &str) -> PromptBuilder {
    PromptBuilder::new(TYPE_SYSTEM_PROMPT, format!("본문: {user_text}"))
}

/// Prompt for category classification, constrained to the candidate list.
pub fn category_prompt(
    user_text: &str,
    category_main: &str,
    candidates: &[String],
) -> PromptBuilder {
    let system = format!(
        "너는 비즈니스 알림 메시지의 2차 카테고리를 분류한다.\n\
         반드시 다음 후보 리스트 안에서만 선택하라. 리스트에 없는 값을 만들어내면 안 된다.\n\
         후보: {candidates:?}\n\
         JSON 한 개만 출력하라: {{\"category_sub\": \"...\", \"explanation\": \"...\"}}"
    );
    PromptBuilder::new(
        system,
        format!("본문: {user_text}\n대분류: {category_main}"),
    )
}

/// Prompt for structured-field extraction.
pub fn fields_prompt(user_text: &str) -> PromptBuilder {
    PromptBuilder::new(FIELDS_SYSTEM_PROMPT, format!("본문: {user_text}"))
}
