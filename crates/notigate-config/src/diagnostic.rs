// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error diagnostics rendered through miette.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic metadata for terminal rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Figment failed to parse or merge the configuration sources.
    ///
    /// Covers unknown keys (rejected by `deny_unknown_fields`), type
    /// mismatches, and malformed TOML; the figment message names the
    /// offending key and source file.
    #[error("failed to load configuration: {message}")]
    #[diagnostic(
        code(notigate::config::load),
        help("check notigate.toml and NOTIGATE_* environment variables")
    )]
    Load {
        /// The underlying figment error message.
        message: String,
    },

    /// A semantic validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(notigate::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load {
            message: err.to_string(),
        }
    }
}

/// Render configuration errors to stderr via miette's fancy report handler.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("{:?}", miette::Report::msg(error.to_string()));
    }
}
