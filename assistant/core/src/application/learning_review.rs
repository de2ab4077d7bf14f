// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Learning review: periodic analysis of the conversation history.
//!
//! The whole memory store is sent to the review provider with an analysis
//! prompt. The reply is kept as the current learning plan (structured when it
//! parses as JSON, raw otherwise) and every run, successful or not, leaves a
//! single line in the learning log.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::application::dispatcher::{ActiveProvider, FailoverDispatcher};
use crate::domain::audit::{AuditEntry, AuditSink};
use crate::domain::file_store::{FileStore, FileStoreError};
use crate::domain::learning::{LearningPlan, LearningReviewError};
use crate::domain::persona::PersonaProfile;
use crate::domain::provider::ProviderRequest;
use crate::domain::repository::MemoryRepository;

/// Number of learning-log lines reported by [`LearningReviewService::status`].
pub const RECENT_LOG_LINES: usize = 10;

/// Body of `GET /api/learning-status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStatusReport {
    pub learning_plan: Option<Value>,
    pub recent_logs: Vec<String>,
}

pub struct LearningReviewService {
    provider: Option<ActiveProvider>,
    dispatcher: Arc<FailoverDispatcher>,
    memory: Arc<dyn MemoryRepository>,
    files: Arc<dyn FileStore>,
    learning_log: Arc<dyn AuditSink>,
    plan_path: PathBuf,
    persona: PersonaProfile,
}

impl LearningReviewService {
    pub fn new(
        provider: Option<ActiveProvider>,
        dispatcher: Arc<FailoverDispatcher>,
        memory: Arc<dyn MemoryRepository>,
        files: Arc<dyn FileStore>,
        learning_log: Arc<dyn AuditSink>,
        plan_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            memory,
            files,
            learning_log,
            plan_path: plan_path.into(),
            persona: PersonaProfile::default(),
        }
    }

    pub fn with_persona(mut self, persona: PersonaProfile) -> Self {
        self.persona = persona;
        self
    }

    /// Run one review and store the resulting plan.
    pub async fn review(&self) -> Result<LearningPlan, LearningReviewError> {
        let result = self.run().await;
        let line = match &result {
            Ok(plan) => format!(
                "Learning plan: {}",
                serde_json::to_string(plan).unwrap_or_default()
            ),
            Err(e) => format!("Learning review failed: {}", e),
        };
        if let Err(e) = self.learning_log.record(AuditEntry::new(line, "")).await {
            warn!("Failed to append to learning log: {}", e);
        }
        result
    }

    async fn run(&self) -> Result<LearningPlan, LearningReviewError> {
        let provider = match &self.provider {
            Some(provider) if provider.has_credentials() => provider,
            _ => return Err(LearningReviewError::NotConfigured),
        };

        let memory = serde_json::to_string(&self.memory.snapshot().await)?;
        let request = ProviderRequest::new(Some(self.analysis_prompt()), memory);
        let client = &provider.client;
        let outcome = self
            .dispatcher
            .dispatch(&provider.credentials, |credential| {
                let request = request.clone();
                async move { client.call(&credential, &request).await }
            })
            .await;

        let raw = outcome.content.ok_or(LearningReviewError::NoContent)?;
        let plan = LearningPlan::from_reply(&raw);
        let rendered = serde_json::to_string_pretty(&plan)?;
        self.files.write(&self.plan_path, &rendered).await?;

        info!(
            structured = matches!(plan, LearningPlan::Structured(_)),
            "Learning review completed"
        );
        Ok(plan)
    }

    /// Current plan plus the tail of the learning log.
    pub async fn status(&self) -> LearningStatusReport {
        let learning_plan = match self.files.read_to_string(&self.plan_path).await {
            Ok(raw) => serde_json::from_str(&raw).ok(),
            Err(FileStoreError::NotFound(_)) => None,
            Err(e) => {
                warn!("Failed to read learning plan: {}", e);
                None
            }
        };
        let recent_logs = self
            .learning_log
            .tail(RECENT_LOG_LINES)
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to read learning log: {}", e);
                Vec::new()
            });

        LearningStatusReport {
            learning_plan,
            recent_logs,
        }
    }

    fn analysis_prompt(&self) -> String {
        format!(
            "Analyze {name}'s past dialogues. Identify missing knowledge, contradictions, or \
             unanswered topics. Suggest what {name} should research or learn next. Return \
             structured JSON.",
            name = self.persona.name
        )
    }
}
