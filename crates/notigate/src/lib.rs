// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notigate: compliance validation and retrieval-augmented generation for
//! business notification templates.
//!
//! This crate is the composition root. It wires configuration to the
//! factory-chosen collaborators and exposes the two entry points an API
//! layer would call: [`Service::validate`] and [`Service::generate`]. Both
//! are wrapped in a whole-pipeline timeout; cancellation drops the request
//! future without partial output (the pipeline performs no writes).

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use notigate_config::NotigateConfig;
use notigate_core::NotigateError;
use notigate_core::template::{GenerationRequest, GenerationResult, Template};
use notigate_core::traits::{LanguageModel, VectorStore};
use notigate_generate::TemplateGenerator;
use notigate_validate::{PipelineOutcome, ValidationPipeline};

pub use notigate_config::{load_and_validate, load_and_validate_str};
pub use notigate_core as core;

/// The assembled compliance and generation service.
pub struct Service {
    pipeline: ValidationPipeline,
    generator: TemplateGenerator,
    validation_timeout: Duration,
    generation_timeout: Duration,
}

impl Service {
    /// Assemble the service from explicit collaborators.
    ///
    /// Pipelines never construct their own collaborators; handles are
    /// injected here and shared.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn VectorStore>,
        config: &NotigateConfig,
    ) -> Self {
        Self {
            pipeline: ValidationPipeline::new(
                model.clone(),
                store.clone(),
                config.validation.clone(),
            ),
            generator: TemplateGenerator::new(model, store, config.generation.clone()),
            validation_timeout: Duration::from_secs(config.validation.pipeline_timeout_secs),
            generation_timeout: Duration::from_secs(config.generation.pipeline_timeout_secs),
        }
    }

    /// Assemble the service from configuration: an OpenAI-compatible model
    /// client and the store the factory selects (remote when `store.url` is
    /// set, in-memory otherwise).
    pub fn from_config(config: &NotigateConfig) -> Result<Self, NotigateError> {
        let model: Arc<dyn LanguageModel> =
            Arc::new(notigate_openai::OpenAiClient::from_config(&config.provider)?);
        let store = notigate_chroma::connect(&config.store)?;
        info!(
            model = %config.provider.default_model,
            "notigate service assembled"
        );
        Ok(Self::new(model, store, config))
    }

    /// Validate a template through the two-gate pipeline.
    ///
    /// The only error is a whole-pipeline timeout; every validation outcome,
    /// including failure, is a returned result value.
    pub async fn validate(&self, template: &Template) -> Result<PipelineOutcome, NotigateError> {
        tokio::time::timeout(self.validation_timeout, self.pipeline.validate(template))
            .await
            .map_err(|_| NotigateError::Timeout {
                duration: self.validation_timeout,
            })
    }

    /// Generate a template for a request.
    ///
    /// The only error is a whole-pipeline timeout; strategy failures are
    /// expressed inside the returned [`GenerationResult`].
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, NotigateError> {
        tokio::time::timeout(self.generation_timeout, self.generator.generate(request))
            .await
            .map_err(|_| NotigateError::Timeout {
                duration: self.generation_timeout,
            })
    }
}

/// Initialize tracing from `RUST_LOG` (defaulting to `info`) for binaries
/// and manual runs.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
