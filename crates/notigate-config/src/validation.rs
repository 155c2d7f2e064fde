// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as threshold ranges and non-zero attempt counts.

use crate::diagnostic::ConfigError;
use crate::model::NotigateConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &NotigateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.provider.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "provider.base_url must not be empty".to_string(),
        });
    }

    if config.provider.default_model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "provider.default_model must not be empty".to_string(),
        });
    }

    if config.provider.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "provider.max_attempts must be at least 1".to_string(),
        });
    }

    if config.store.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "store.max_attempts must be at least 1".to_string(),
        });
    }

    if let Some(url) = &config.store.url
        && url.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "store.url must not be empty when set; omit it to use the in-memory store"
                .to_string(),
        });
    }

    for (key, value) in [
        (
            "validation.guideline_similarity",
            config.validation.guideline_similarity,
        ),
        (
            "generation.reference_similarity",
            config.generation.reference_similarity,
        ),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be within [0.0, 1.0], got {value}"),
            });
        }
    }

    if config.generation.select_count > config.generation.top_k {
        errors.push(ConfigError::Validation {
            message: format!(
                "generation.select_count ({}) must not exceed generation.top_k ({})",
                config.generation.select_count, config.generation.top_k
            ),
        });
    }

    if config.generation.top_k == 0 {
        errors.push(ConfigError::Validation {
            message: "generation.top_k must be at least 1".to_string(),
        });
    }

    if config.validation.rendered_body_max == 0 {
        errors.push(ConfigError::Validation {
            message: "validation.rendered_body_max must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
