// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Notigate compliance pipeline.
//!
//! Structural and policy violations are never surfaced through this enum --
//! they accumulate inside [`crate::template::ValidationResult`]. This type
//! covers the failures that interrupt a call: unreachable collaborators,
//! unparseable model output, rendering faults, timeouts.

use thiserror::Error;

/// The primary error type used across Notigate traits and pipeline stages.
#[derive(Debug, Error)]
pub enum NotigateError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Language model service errors (API failure, auth, rate limits).
    #[error("model service error: {message}")]
    Service {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Vector store errors (connection failure, malformed store response).
    #[error("vector store error: {message}")]
    Store {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The model produced output that could not be parsed as the expected
    /// structure. Distinct from [`NotigateError::Service`]: the call itself
    /// succeeded.
    #[error("unparseable model output: {message}")]
    Parse { message: String },

    /// Variable substitution failed while rendering a template.
    #[error("render error: {0}")]
    Render(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NotigateError {
    /// Shorthand for a sourceless service error.
    pub fn service(message: impl Into<String>) -> Self {
        NotigateError::Service {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a sourceless store error.
    pub fn store(message: impl Into<String>) -> Self {
        NotigateError::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        NotigateError::Parse {
            message: message.into(),
        }
    }
}
