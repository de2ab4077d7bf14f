// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Self-Edit Pipeline
//!
//! Implements `requestSelfEdit(filePath, feedback)`:
//!
//! 1. **Idle**: refuse immediately when no credential is configured, and
//!    read the target (unreadable target: nothing else happens).
//! 2. **Requesting**: ask the review provider for a full rewrite, through
//!    the failover dispatcher and the persona leakage loop.
//! 3. **Validating**: write the candidate next to the target and run the
//!    syntax validator on it.
//! 4. **Committed**: rename the candidate over the target.
//!    **RolledBack**: delete the candidate; the target is never touched.
//!
//! This pipeline trusts its caller on path safety. Protected paths must be
//! rejected by [`EditGuardrail`](crate::domain::guardrail::EditGuardrail)
//! before `request_self_edit` is called; no path check happens here.
//!
//! Concurrent edits of the same target are not serialized. Callers that can
//! issue them must add their own single-flight guard.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::application::dispatcher::{ActiveProvider, FailoverDispatcher};
use crate::application::persona::PersonaGenerator;
use crate::domain::audit::{AuditEntry, AuditSink};
use crate::domain::file_store::FileStore;
use crate::domain::learning::strip_code_fence;
use crate::domain::provider::ProviderRequest;
use crate::domain::self_edit::{
    EditCandidate, EditProvenance, EditReceipt, EditState, SelfEditError, SyntaxValidator,
    ValidationVerdict, DEFAULT_CANDIDATE_SUFFIX, SELF_EDIT_SYSTEM_PROMPT,
};
use crate::infrastructure::telemetry::Telemetry;

pub struct SelfEditPipeline {
    provider: Option<ActiveProvider>,
    dispatcher: Arc<FailoverDispatcher>,
    generator: Arc<PersonaGenerator>,
    files: Arc<dyn FileStore>,
    validator: Arc<dyn SyntaxValidator>,
    edit_log: Arc<dyn AuditSink>,
    candidate_suffix: String,
}

impl SelfEditPipeline {
    pub fn new(
        provider: Option<ActiveProvider>,
        dispatcher: Arc<FailoverDispatcher>,
        generator: Arc<PersonaGenerator>,
        files: Arc<dyn FileStore>,
        validator: Arc<dyn SyntaxValidator>,
        edit_log: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            generator,
            files,
            validator,
            edit_log,
            candidate_suffix: DEFAULT_CANDIDATE_SUFFIX.to_string(),
        }
    }

    pub fn with_candidate_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.candidate_suffix = suffix.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider
            .as_ref()
            .map(ActiveProvider::has_credentials)
            .unwrap_or(false)
    }

    pub async fn request_self_edit(
        &self,
        target: &Path,
        feedback: &str,
    ) -> Result<EditReceipt, SelfEditError> {
        let result = self.run(target, feedback).await;
        match &result {
            Ok(receipt) => {
                Telemetry::record_self_edit(&EditState::Committed.to_string());
                info!(target = %receipt.target.display(), provider = %receipt.provider, "Self-edit committed");
            }
            Err(e) => {
                Telemetry::record_self_edit(&e.final_state().to_string());
                warn!(target = %target.display(), state = %e.final_state(), "Self-edit did not commit: {}", e);
            }
        }
        result
    }

    async fn run(&self, target: &Path, feedback: &str) -> Result<EditReceipt, SelfEditError> {
        let provider = match &self.provider {
            Some(provider) if provider.has_credentials() => provider,
            _ => {
                info!(target = %target.display(), "Self-edit skipped: no credential configured");
                return Err(SelfEditError::NotConfigured);
            }
        };

        let original = self
            .files
            .read_to_string(target)
            .await
            .map_err(SelfEditError::Unreadable)?;

        let mut state = EditState::Idle;
        self.advance(&mut state, EditState::Requesting);

        let provenance = EditProvenance {
            feedback: feedback.to_string(),
            requested_at: Utc::now(),
        };
        let request = self.rewrite_request(feedback, &original);
        let outcome = self.dispatcher.query(provider, &self.generator, &request).await;

        let mut content = match outcome.content.as_deref().map(strip_code_fence) {
            Some(content) if !content.trim().is_empty() => content.to_string(),
            _ => {
                self.advance(&mut state, EditState::RolledBack);
                self.audit(
                    format!("Code update failed for {}", target.display()),
                    "No content returned".to_string(),
                )
                .await;
                return Err(SelfEditError::NoContent);
            }
        };

        // Replies lose their final newline to trimming; keep the target's.
        if original.ends_with('\n') && !content.ends_with('\n') {
            content.push('\n');
        }

        let candidate = EditCandidate {
            target: target.to_path_buf(),
            content,
            provenance,
        };
        let sibling = candidate.sibling_path(&self.candidate_suffix);

        self.advance(&mut state, EditState::Validating);
        let verdict = match self.files.write(&sibling, &candidate.content).await {
            Ok(()) => self.validator.check(&sibling).await,
            Err(e) => ValidationVerdict::Fail(format!("Failed to write candidate: {}", e)),
        };

        if let ValidationVerdict::Fail(diagnostic) = verdict {
            self.advance(&mut state, EditState::RolledBack);
            self.discard(&sibling).await;
            self.audit(
                format!("Code update failed for {}", target.display()),
                diagnostic.clone(),
            )
            .await;
            return Err(SelfEditError::Validation(diagnostic));
        }

        if let Err(e) = self.files.rename(&sibling, target).await {
            self.advance(&mut state, EditState::RolledBack);
            self.discard(&sibling).await;
            self.audit(
                format!("Code update failed for {}", target.display()),
                e.to_string(),
            )
            .await;
            return Err(SelfEditError::Storage(e));
        }

        self.advance(&mut state, EditState::Committed);
        let committed_at = Utc::now();
        self.audit(
            format!(
                "Code updated for {} at {}",
                target.display(),
                committed_at.to_rfc3339()
            ),
            format!("Feedback: {}", candidate.provenance.feedback),
        )
        .await;

        Ok(EditReceipt {
            target: candidate.target,
            committed_at,
            provider: provider.name().to_string(),
        })
    }

    fn rewrite_request(&self, feedback: &str, original: &str) -> ProviderRequest {
        let instruction = format!(
            "You are {}'s evolution assistant. Review this code and {}. Only modify functions, \
             keep all security and safety intact. Return complete updated code.",
            self.generator.profile().name,
            feedback
        );
        ProviderRequest::new(Some(SELF_EDIT_SYSTEM_PROMPT.to_string()), instruction)
            .with_turn(original)
    }

    fn advance(&self, state: &mut EditState, next: EditState) {
        debug_assert!(state.can_transition_to(next), "{} -> {}", state, next);
        tracing::debug!(from = %state, to = %next, "Self-edit state change");
        *state = next;
    }

    /// Remove the candidate. A failed delete is logged and never replaces
    /// the primary error.
    async fn discard(&self, sibling: &Path) {
        if !self.files.exists(sibling).await {
            return;
        }
        if let Err(e) = self.files.delete(sibling).await {
            error!(candidate = %sibling.display(), "Failed to delete self-edit candidate: {}", e);
            self.audit(
                format!("Candidate cleanup failed for {}", sibling.display()),
                e.to_string(),
            )
            .await;
        }
    }

    async fn audit(&self, context: String, payload: String) {
        if let Err(e) = self.edit_log.record(AuditEntry::new(context, payload)).await {
            warn!("Failed to append to self-edit log: {}", e);
        }
    }
}
