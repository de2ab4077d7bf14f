// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Chat Application Service
//!
//! Implements `handleChat`: one user message in, one [`ChatResponse`] out.
//!
//! ```text
//! message -> arithmetic shortcut (optional)
//!         -> FailoverDispatcher per active provider
//!              -> PersonaGenerator leakage loop per credential
//!         -> ConfidencePolicy
//!         -> MemoryRepository::append
//!         -> LearningQueueRepository::enqueue (fallback turns only)
//! ```
//!
//! Provider failures never escape this service. They become `errors`
//! entries and trace lines, and the turn degrades to the clarification
//! reply when nothing usable came back.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::application::dispatcher::{ActiveProvider, DispatchOutcome, FailoverDispatcher};
use crate::application::persona::PersonaGenerator;
use crate::domain::arithmetic;
use crate::domain::chat::{ChatResponse, ChatTurn, ErrorEntry, ReasoningTrace};
use crate::domain::confidence::ConfidencePolicy;
use crate::domain::learning::QueuedLearningItem;
use crate::domain::provider::{ProviderCapability, ProviderRequest};
use crate::domain::repository::{LearningQueueRepository, MemoryRepository};
use crate::infrastructure::telemetry::Telemetry;

/// Source name reported when the local evaluator answered.
pub const MATH_SOURCE: &str = "mathCore";

const PERSONA_PROBE_PROMPT: &str = "Provide a short 2-3 sentence answer introducing yourself.";

/// Result of `GET /api/test-persona`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaProbe {
    pub persona: String,
    pub sample: String,
}

pub struct ChatService {
    providers: Vec<ActiveProvider>,
    dispatcher: Arc<FailoverDispatcher>,
    generator: Arc<PersonaGenerator>,
    policy: ConfidencePolicy,
    memory: Arc<dyn MemoryRepository>,
    learning_queue: Arc<dyn LearningQueueRepository>,
    concurrent: bool,
}

impl ChatService {
    pub fn new(
        providers: Vec<ActiveProvider>,
        dispatcher: Arc<FailoverDispatcher>,
        generator: Arc<PersonaGenerator>,
        memory: Arc<dyn MemoryRepository>,
        learning_queue: Arc<dyn LearningQueueRepository>,
    ) -> Self {
        Self {
            providers,
            dispatcher,
            generator,
            policy: ConfidencePolicy::default(),
            memory,
            learning_queue,
            concurrent: false,
        }
    }

    /// Query all active providers at once. Results are collected in arrival
    /// order.
    pub fn with_concurrent_dispatch(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn with_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn providers(&self) -> &[ActiveProvider] {
        &self.providers
    }

    pub async fn handle_chat(&self, message: &str) -> ChatResponse {
        let mut trace = ReasoningTrace::new();
        let mut replies: Vec<(String, String)> = Vec::new();
        let mut attempted: Vec<String> = Vec::new();
        let mut errors: Vec<ErrorEntry> = Vec::new();

        if arithmetic::is_arithmetic(message) {
            if let Some(value) = arithmetic::evaluate(message.trim()) {
                replies.push((
                    MATH_SOURCE.to_string(),
                    format!("Math result: {}", arithmetic::format_result(value)),
                ));
                trace.push("Used mathCore for computation");
            }
        }

        let request = self.generator.request(message);
        let mut queried = Vec::new();
        for provider in &self.providers {
            if !provider.has_credentials() {
                trace.push(format!("No {} credential configured", provider.name()));
            } else {
                attempted.push(provider.name().to_string());
                queried.push(provider);
            }
        }

        for (name, outcome) in self.query_all(&queried, &request).await {
            trace.extend(outcome.trace);
            errors.extend(outcome.errors);
            if let Some(content) = outcome.content.filter(|c| !c.trim().is_empty()) {
                replies.push((name, content));
            }
        }

        let texts: Vec<String> = replies.iter().map(|(_, text)| text.clone()).collect();
        let sources: Vec<String> = replies.into_iter().map(|(source, _)| source).collect();
        let assessment = self.policy.assess(&texts);

        if assessment.is_fallback {
            trace.push("Unknown flow triggered: fallback or low-confidence answer.");
        } else {
            trace.push(format!("Synthesized from: {}", sources.join(", ")));
        }

        let turn = ChatTurn::new(
            message,
            assessment.reply.clone(),
            assessment.confidence,
            sources.clone(),
            assessment.is_fallback,
        );
        let memory_update = match self.memory.append(turn).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist chat turn: {}", e);
                false
            }
        };

        if assessment.is_fallback {
            let item = QueuedLearningItem::new(message, attempted, errors.clone());
            if let Err(e) = self.learning_queue.enqueue(item).await {
                warn!("Failed to queue message for learning: {}", e);
            }
        }

        Telemetry::record_chat_turn(assessment.is_fallback);
        info!(
            confidence = assessment.confidence,
            is_fallback = assessment.is_fallback,
            sources = sources.len(),
            errors = errors.len(),
            "Chat turn answered"
        );

        ChatResponse {
            reply: assessment.reply,
            sources,
            reasoning_summary: trace.summary(),
            confidence: assessment.confidence,
            memory_update,
            errors,
            is_fallback: assessment.is_fallback,
        }
    }

    /// Short self-introduction from the first chat-completion provider with
    /// a credential, or the local persona sample when there is none.
    pub async fn probe_persona(&self) -> PersonaProbe {
        let persona = self.generator.profile().name.to_lowercase();
        let provider = self.providers.iter().find(|p| {
            p.client.capability() == ProviderCapability::ChatCompletion && p.has_credentials()
        });

        let sample = match provider {
            Some(provider) => {
                let request = self.generator.request(PERSONA_PROBE_PROMPT);
                self.query(provider, &request)
                    .await
                    .content
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| self.generator.profile().local_sample())
            }
            None => self.generator.profile().local_sample(),
        };

        PersonaProbe { persona, sample }
    }

    async fn query_all(
        &self,
        providers: &[&ActiveProvider],
        request: &ProviderRequest,
    ) -> Vec<(String, DispatchOutcome)> {
        if self.concurrent {
            let mut pending: FuturesUnordered<_> = providers
                .iter()
                .map(|provider| async move {
                    (provider.name().to_string(), self.query(provider, request).await)
                })
                .collect();
            let mut outcomes = Vec::with_capacity(providers.len());
            while let Some(outcome) = pending.next().await {
                outcomes.push(outcome);
            }
            outcomes
        } else {
            let mut outcomes = Vec::with_capacity(providers.len());
            for provider in providers {
                outcomes.push((provider.name().to_string(), self.query(provider, request).await));
            }
            outcomes
        }
    }

    async fn query(&self, provider: &ActiveProvider, request: &ProviderRequest) -> DispatchOutcome {
        self.dispatcher
            .query(provider, &self.generator, request)
            .await
    }
}
