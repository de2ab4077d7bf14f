// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Assistant Factory - Application Layer
//!
//! Builds the complete set of use cases from an [`AssistantConfigManifest`]:
//! provider registry, file-backed stores, operator logs and the services
//! that share them. The HTTP server and the embedded CLI commands both start
//! from [`Assistant::from_config`].
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Wires infrastructure implementations into application services

use anyhow::Context;
use std::sync::Arc;

use crate::application::chat::ChatService;
use crate::application::dispatcher::FailoverDispatcher;
use crate::application::learning_review::LearningReviewService;
use crate::application::persona::PersonaGenerator;
use crate::application::self_edit::SelfEditPipeline;
use crate::domain::audit::AuditSink;
use crate::domain::config::AssistantConfigManifest;
use crate::domain::credential::CredentialSource;
use crate::domain::file_store::FileStore;
use crate::domain::guardrail::EditGuardrail;
use crate::domain::persona::{PersonaProfile, PersonaSanitizer};
use crate::domain::repository::{LearningQueueRepository, MemoryRepository};
use crate::infrastructure::audit_log::AppendLog;
use crate::infrastructure::file_store::LocalFileStore;
use crate::infrastructure::llm::ProviderRegistry;
use crate::infrastructure::repositories::{JsonFileLearningQueue, JsonFileMemoryStore};
use crate::infrastructure::validator::CommandSyntaxValidator;

/// Everything a running assistant needs, shared behind `Arc`s.
#[derive(Clone)]
pub struct Assistant {
    pub chat: Arc<ChatService>,
    pub self_edit: Arc<SelfEditPipeline>,
    pub learning: Arc<LearningReviewService>,
    pub memory: Arc<dyn MemoryRepository>,
    pub learning_queue: Arc<dyn LearningQueueRepository>,
    pub guardrail: EditGuardrail,
    pub error_log: Arc<dyn AuditSink>,
}

impl Assistant {
    /// Load stores and build every service from configuration
    pub async fn from_config(
        config: &AssistantConfigManifest,
        credentials: &dyn CredentialSource,
    ) -> anyhow::Result<Self> {
        let spec = &config.spec;
        let registry = ProviderRegistry::from_config(spec, credentials);

        tokio::fs::create_dir_all(&spec.storage.log_dir)
            .await
            .with_context(|| format!("Failed to create log directory {:?}", spec.storage.log_dir))?;

        let error_log: Arc<dyn AuditSink> = Arc::new(AppendLog::new(spec.storage.error_log()));
        let edit_log: Arc<dyn AuditSink> = Arc::new(AppendLog::new(spec.storage.edit_log()));
        let learning_log: Arc<dyn AuditSink> =
            Arc::new(AppendLog::new(spec.storage.learning_log()));

        let memory: Arc<dyn MemoryRepository> = Arc::new(
            JsonFileMemoryStore::load(&spec.storage.memory_file, &spec.persona.personality).await,
        );
        let learning_queue: Arc<dyn LearningQueueRepository> =
            Arc::new(JsonFileLearningQueue::load(&spec.storage.learning_queue_file).await);
        let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new());

        let profile = PersonaProfile::new(spec.persona.name.clone());
        let dispatcher = Arc::new(FailoverDispatcher::new(error_log.clone()));
        let generator = Arc::new(
            PersonaGenerator::new(profile.clone(), Arc::new(PersonaSanitizer::new()))
                .with_bound(spec.persona.leakage_retry_bound)
                .with_error_log(error_log.clone()),
        );

        let chat = ChatService::new(
            registry.active_providers(&spec.dispatch),
            dispatcher.clone(),
            generator.clone(),
            memory.clone(),
            learning_queue.clone(),
        )
        .with_concurrent_dispatch(spec.dispatch.concurrent);

        let self_edit = SelfEditPipeline::new(
            registry.review_provider(spec.self_edit.provider.as_deref()),
            dispatcher.clone(),
            generator,
            files.clone(),
            Arc::new(CommandSyntaxValidator::new(
                spec.self_edit.validator_command.clone(),
            )),
            edit_log,
        )
        .with_candidate_suffix(spec.self_edit.candidate_suffix.clone());

        let learning = LearningReviewService::new(
            registry.review_provider(spec.learning.provider.as_deref()),
            dispatcher,
            memory.clone(),
            files,
            learning_log,
            spec.storage.learning_plan_file.clone(),
        )
        .with_persona(profile);

        Ok(Self {
            chat: Arc::new(chat),
            self_edit: Arc::new(self_edit),
            learning: Arc::new(learning),
            memory,
            learning_queue,
            guardrail: EditGuardrail::new(spec.self_edit.protected_patterns.clone()),
            error_log,
        })
    }
}
