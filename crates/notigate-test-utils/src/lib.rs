// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for Notigate: a scripted language model and corpus fixtures.

pub mod fixtures;
pub mod mock_model;

pub use fixtures::{approved_template_doc, rule_doc};
pub use mock_model::MockModel;
