// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./notigate.toml` > `~/.config/notigate/notigate.toml`
//! > `/etc/notigate/notigate.toml` with environment variable overrides via the
//! `NOTIGATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::NotigateConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/notigate/notigate.toml` (system-wide)
/// 3. `~/.config/notigate/notigate.toml` (user XDG config)
/// 4. `./notigate.toml` (local directory)
/// 5. `NOTIGATE_*` environment variables
pub fn load_config() -> Result<NotigateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NotigateConfig::default()))
        .merge(Toml::file("/etc/notigate/notigate.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("notigate/notigate.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("notigate.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<NotigateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NotigateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NotigateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NotigateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `NOTIGATE_PROVIDER_API_KEY` must map to
/// `provider.api_key`, not `provider.api.key`.
fn env_provider() -> Env {
    Env::prefixed("NOTIGATE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: NOTIGATE_PROVIDER_API_KEY -> "provider_api_key"
        let mapped = key
            .as_str()
            .replacen("provider_", "provider.", 1)
            .replacen("store_", "store.", 1)
            .replacen("validation_", "validation.", 1)
            .replacen("generation_", "generation.", 1);
        mapped.into()
    })
}
