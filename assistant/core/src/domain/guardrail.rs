// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Self-edit guardrail.
//!
//! Callers run this before handing a path to
//! `crate::application::self_edit::SelfEditPipeline`, which trusts its caller
//! and performs no path check of its own. The check is plain substring
//! rejection against configured patterns; it makes no claim about symlinks,
//! `..` components or case-folding filesystems.

use tracing::warn;

pub const DEFAULT_PROTECTED_PATTERNS: &[&str] = &["server.js", ".env", "/core"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardrailRejection {
    #[error("No target file provided")]
    MissingPath,

    #[error("Editing critical files is not allowed ({pattern})")]
    Protected { pattern: String },
}

#[derive(Debug, Clone)]
pub struct EditGuardrail {
    protected_patterns: Vec<String>,
}

impl Default for EditGuardrail {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_PATTERNS.iter().map(|p| p.to_string()).collect())
    }
}

impl EditGuardrail {
    pub fn new(protected_patterns: Vec<String>) -> Self {
        Self { protected_patterns }
    }

    pub fn check(&self, path: &str) -> Result<(), GuardrailRejection> {
        if path.trim().is_empty() {
            return Err(GuardrailRejection::MissingPath);
        }

        if let Some(pattern) = self
            .protected_patterns
            .iter()
            .find(|pattern| path.contains(pattern.as_str()))
        {
            warn!(path = %path, pattern = %pattern, "Self-edit rejected by guardrail");
            return Err(GuardrailRejection::Protected {
                pattern: pattern.clone(),
            });
        }

        Ok(())
    }
}
