// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language model service trait.

use async_trait::async_trait;

use crate::error::NotigateError;
use crate::types::ChatMessage;

/// A chat-completion language model service.
///
/// Implementations handle transport, authentication, timeouts and bounded
/// retry; after retries are exhausted they surface
/// [`NotigateError::Service`]. Output that arrives but cannot be parsed into
/// the structure a caller expects is the caller's concern
/// ([`NotigateError::Parse`]), not the implementation's.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends a completion request and returns the generated text.
    ///
    /// `model` overrides the implementation's default model id when set.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: Option<&str>,
    ) -> Result<String, NotigateError>;
}
