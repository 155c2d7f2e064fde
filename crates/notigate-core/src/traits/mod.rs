// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the external collaborators of the pipeline.

pub mod model;
pub mod store;

pub use model::LanguageModel;
pub use store::VectorStore;
