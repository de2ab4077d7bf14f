// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Leakage-avoidance generation loop.
//!
//! A bounded state machine around one provider call:
//!
//! ```text
//! attempt 1: request            -> clean?  yes -> scrub, return
//!                                          no  -> attempt 2
//! attempt n: request + strict    -> clean?  yes -> scrub, return
//!                                          no  -> n == bound ? scrub, return : attempt n+1
//! ```
//!
//! The loop never runs more than `bound` calls. When every attempt leaks, the
//! last reply is returned scrubbed. Call failures are returned unchanged so
//! the surrounding [`FailoverDispatcher`](super::dispatcher::FailoverDispatcher)
//! can classify them.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::audit::{AuditEntry, AuditSink};
use crate::domain::persona::{PersonaProfile, PersonaSanitizer, DEFAULT_LEAKAGE_RETRY_BOUND};
use crate::domain::provider::{ProviderFailure, ProviderRequest};
use crate::infrastructure::telemetry::Telemetry;

pub struct PersonaGenerator {
    profile: PersonaProfile,
    sanitizer: Arc<PersonaSanitizer>,
    bound: u32,
    error_log: Option<Arc<dyn AuditSink>>,
}

impl PersonaGenerator {
    pub fn new(profile: PersonaProfile, sanitizer: Arc<PersonaSanitizer>) -> Self {
        Self {
            profile,
            sanitizer,
            bound: DEFAULT_LEAKAGE_RETRY_BOUND,
            error_log: None,
        }
    }

    /// Maximum number of calls per generation. Values below 1 are raised to 1.
    pub fn with_bound(mut self, bound: u32) -> Self {
        self.bound = bound.max(1);
        self
    }

    /// Record every leaked attempt in the operator error log.
    pub fn with_error_log(mut self, error_log: Arc<dyn AuditSink>) -> Self {
        self.error_log = Some(error_log);
        self
    }

    pub fn profile(&self) -> &PersonaProfile {
        &self.profile
    }

    pub fn sanitizer(&self) -> &PersonaSanitizer {
        &self.sanitizer
    }

    pub fn bound(&self) -> u32 {
        self.bound
    }

    /// Request with the persona system prompt and a single user message.
    pub fn request(&self, message: impl Into<String>) -> ProviderRequest {
        ProviderRequest::new(Some(self.profile.system_prompt()), message)
    }

    /// Run `call` until it returns a reply without vendor leakage or the
    /// bound is reached. Returns the scrubbed reply.
    pub async fn generate<F, Fut>(
        &self,
        provider: &str,
        request: &ProviderRequest,
        mut call: F,
    ) -> Result<String, ProviderFailure>
    where
        F: FnMut(ProviderRequest) -> Fut,
        Fut: Future<Output = Result<String, ProviderFailure>>,
    {
        let strict = self.profile.strict_instruction();
        let mut next = request.clone();
        let mut attempt = 1;

        loop {
            let raw = call(next).await?;

            if !self.sanitizer.detects_leakage(&raw) {
                debug!(provider = %provider, attempt, "Reply passed persona check");
                return Ok(self.sanitizer.scrub(&raw));
            }

            info!(
                provider = %provider,
                attempt,
                bound = self.bound,
                "Vendor mentions detected in reply"
            );
            Telemetry::record_persona_retry(provider);
            self.log_leak(provider, attempt).await;

            if attempt >= self.bound {
                return Ok(self.sanitizer.scrub(&raw));
            }

            attempt += 1;
            next = request.with_instruction(&strict);
        }
    }

    async fn log_leak(&self, provider: &str, attempt: u32) {
        let Some(error_log) = &self.error_log else {
            return;
        };
        let entry = AuditEntry::new(
            format!("{} vendor-scan", provider),
            format!(
                "Vendor mentions detected; attempt {} of {}",
                attempt, self.bound
            ),
        );
        if let Err(e) = error_log.record(entry).await {
            tracing::warn!("Failed to append to error log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::FailureKind;
    use parking_lot::Mutex;

    fn generator(bound: u32) -> PersonaGenerator {
        PersonaGenerator::new(PersonaProfile::default(), Arc::new(PersonaSanitizer::new()))
            .with_bound(bound)
    }

    #[tokio::test]
    async fn test_clean_reply_needs_one_call() {
        let generator = generator(3);
        let seen = Mutex::new(Vec::new());

        let reply = generator
            .generate("OpenRouter", &generator.request("hi"), |request| {
                seen.lock().push(request);
                async { Ok("  Hello there.  ".to_string()) }
            })
            .await
            .unwrap();

        assert_eq!(reply, "Hello there.");
        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_adds_strict_instruction() {
        let generator = generator(3);
        let seen = Mutex::new(Vec::new());

        let reply = generator
            .generate("OpenRouter", &generator.request("who are you?"), |request| {
                let first = seen.lock().is_empty();
                seen.lock().push(request);
                async move {
                    if first {
                        Ok("I am an AI developed by OpenAI.".to_string())
                    } else {
                        Ok("I am Jarvis.".to_string())
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(reply, "I am Jarvis.");
        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].user_turns[0], "who are you?");
        assert_eq!(
            seen[1].user_turns[0],
            "Please reply strictly as Jarvis and do not include any provider or vendor names. who are you?"
        );
    }

    #[tokio::test]
    async fn test_always_leaking_reply_stops_at_bound() {
        for bound in 1..=5 {
            let generator = generator(bound);
            let calls = Mutex::new(0u32);

            let reply = generator
                .generate("xAI", &generator.request("hi"), |_| {
                    *calls.lock() += 1;
                    async { Ok("Built by OpenAI. The answer is 4.".to_string()) }
                })
                .await
                .unwrap();

            assert_eq!(*calls.lock(), bound);
            assert_eq!(reply, "Built by . The answer is 4.");
        }
    }

    #[tokio::test]
    async fn test_failure_is_returned_unchanged() {
        let generator = generator(3);
        let err = generator
            .generate("OpenRouter", &generator.request("hi"), |_| async {
                Err(ProviderFailure::from_status(403, "forbidden"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Auth);
    }

    #[test]
    fn test_bound_is_at_least_one() {
        assert_eq!(generator(0).bound(), 1);
    }
}
