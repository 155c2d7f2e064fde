// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible chat-completions provider for Notigate.
//!
//! Implements [`notigate_core::LanguageModel`] over an OpenAI-style
//! `/v1/chat/completions` endpoint with bounded retry and timeouts.

pub mod client;
pub mod types;

pub use client::{OpenAiClient, strip_code_fences};
