// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock language model for deterministic testing.
//!
//! `MockModel` implements [`LanguageModel`] with pre-configured responses,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use notigate_core::error::NotigateError;
use notigate_core::traits::LanguageModel;
use notigate_core::types::ChatMessage;

/// One scripted reply: either text to return, or a failure to inject.
#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    ServiceError(String),
}

/// A mock model that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a
/// default "mock response" text is returned.
pub struct MockModel {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
}

impl MockModel {
    /// Create a new mock model with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a mock model pre-loaded with the given text responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.into_iter().map(Scripted::Text).collect(),
            )),
        }
    }

    /// Add a text response to the end of the queue.
    pub async fn push_response(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .await
            .push_back(Scripted::Text(text.into()));
    }

    /// Add a service failure to the end of the queue; the matching
    /// `complete` call will return `NotigateError::Service`.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .await
            .push_back(Scripted::ServiceError(message.into()));
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _model: Option<&str>,
    ) -> Result<String, NotigateError> {
        match self.responses.lock().await.pop_front() {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::ServiceError(message)) => Err(NotigateError::service(message)),
            None => Ok("mock response".to_string()),
        }
    }
}
