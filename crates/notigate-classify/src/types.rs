// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification result types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Message type, determined by two orthogonal properties of the text:
/// whether it carries a channel-addition call to action, and whether it
/// carries substantive extra explanatory content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Basic,
    ExtraInfo,
    ChannelAdd,
    Hybrid,
}

impl MessageType {
    /// Combine the two flags into a type. The flags are authoritative; a
    /// model-claimed type that disagrees with its own flags is discarded.
    pub fn from_flags(has_channel_link: bool, has_extra_info: bool) -> Self {
        match (has_channel_link, has_extra_info) {
            (true, true) => MessageType::Hybrid,
            (true, false) => MessageType::ChannelAdd,
            (false, true) => MessageType::ExtraInfo,
            (false, false) => MessageType::Basic,
        }
    }
}

/// Result of message-type classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeClassification {
    pub message_type: MessageType,
    pub has_channel_link: bool,
    pub has_extra_info: bool,
    pub explanation: String,
}

impl Default for TypeClassification {
    /// The uniform fallback used when the model call fails or its output
    /// cannot be parsed.
    fn default() -> Self {
        Self {
            message_type: MessageType::Basic,
            has_channel_link: false,
            has_extra_info: false,
            explanation: String::new(),
        }
    }
}

/// Result of category classification against a closed candidate list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryClassification {
    pub category_sub: String,
    pub explanation: String,
}

/// Structured fields extracted from the user text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExtraction {
    pub intent_type: String,
    pub recipient_scope: String,
    pub links_allowed: bool,
    pub variables: Vec<String>,
}

/// Combined output of the three analysis steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAnalysis {
    pub type_result: TypeClassification,
    pub category_result: CategoryClassification,
    pub fields: FieldExtraction,
}
