// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Notigate pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Notigate configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values; the
/// defaults run entirely against the in-memory store.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotigateConfig {
    /// Language model provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Vector store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Validation pipeline settings.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Template generation settings.
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Language model provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key. `None` requires the provider to read it from the environment.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default model id for pipeline requests.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request (first try plus retries).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

/// Vector store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Base URL of the remote vector store. `None` selects the in-memory
    /// fallback store at construction time.
    #[serde(default)]
    pub url: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request (first try plus retries).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Validation pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Guideline similarity above which a retrieved policy document
    /// participates in the alignment check.
    #[serde(default = "default_similarity_threshold")]
    pub guideline_similarity: f32,

    /// Maximum policy excerpts included in the adjudication prompt.
    #[serde(default = "default_max_excerpts")]
    pub max_policy_excerpts: usize,

    /// Rendered body length limit, checked after variable substitution.
    #[serde(default = "default_rendered_body_max")]
    pub rendered_body_max: usize,

    /// Whole-pipeline timeout in seconds for one validate call.
    #[serde(default = "default_pipeline_timeout_secs")]
    pub pipeline_timeout_secs: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            guideline_similarity: default_similarity_threshold(),
            max_policy_excerpts: default_max_excerpts(),
            rendered_body_max: default_rendered_body_max(),
            pipeline_timeout_secs: default_pipeline_timeout_secs(),
        }
    }
}

/// Template generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Similarity at or above which retrieval candidates qualify as
    /// generation references.
    #[serde(default = "default_similarity_threshold")]
    pub reference_similarity: f32,

    /// Candidates fetched from the approved corpus.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Candidates kept after narrowing.
    #[serde(default = "default_select_count")]
    pub select_count: usize,

    /// Generated title length cap in characters.
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,

    /// Whole-pipeline timeout in seconds for one generate call.
    #[serde(default = "default_pipeline_timeout_secs")]
    pub pipeline_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            reference_similarity: default_similarity_threshold(),
            top_k: default_top_k(),
            select_count: default_select_count(),
            title_max_chars: default_title_max_chars(),
            pipeline_timeout_secs: default_pipeline_timeout_secs(),
        }
    }
}

fn default_similarity_threshold() -> f32 {
    0.7
}

fn default_max_excerpts() -> usize {
    5
}

fn default_rendered_body_max() -> usize {
    1000
}

fn default_pipeline_timeout_secs() -> u64 {
    120
}

fn default_top_k() -> usize {
    3
}

fn default_select_count() -> usize {
    2
}

fn default_title_max_chars() -> usize {
    10
}
