// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Failover Dispatcher
//!
//! Walks one provider's [`CredentialPool`] in preference order. An
//! authorization failure (401/403) moves on to the next credential; any other
//! failure ends the walk for this provider, since a rate limit, outage or
//! malformed reply will not improve with a different key. There is no
//! backoff: the provider is simply tried again on the next request.
//!
//! Every attempt lands in the per-request [`ReasoningTrace`]. Failures are
//! also appended to the durable error log. That log is an operator file and
//! carries the raw credential so a bad key can be identified; the
//! [`ErrorEntry`] list returned to callers only names the slot (`KEY_n`).

use std::future::Future;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::application::persona::PersonaGenerator;
use crate::domain::audit::{AuditEntry, AuditSink};
use crate::domain::chat::{ErrorEntry, ReasoningTrace};
use crate::domain::credential::{Credential, CredentialPool};
use crate::domain::provider::{
    AttemptOutcome, ProviderAttempt, ProviderClient, ProviderFailure, ProviderRequest,
};
use crate::infrastructure::telemetry::Telemetry;

/// A provider client paired with the credentials it is tried with.
#[derive(Clone)]
pub struct ActiveProvider {
    pub client: Arc<dyn ProviderClient>,
    pub credentials: CredentialPool,
}

impl ActiveProvider {
    pub fn new(client: Arc<dyn ProviderClient>, credentials: CredentialPool) -> Self {
        Self {
            client,
            credentials,
        }
    }

    pub fn name(&self) -> &str {
        self.client.name()
    }

    pub fn has_credentials(&self) -> bool {
        !self.credentials.is_empty()
    }
}

/// Everything one `dispatch` call learned.
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    /// Content of the successful attempt, if any.
    pub content: Option<String>,
    /// Zero-based index of the credential that succeeded.
    pub succeeded_index: Option<usize>,
    pub attempts: Vec<ProviderAttempt>,
    pub trace: ReasoningTrace,
    pub errors: Vec<ErrorEntry>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.content.is_some()
    }
}

pub struct FailoverDispatcher {
    error_log: Arc<dyn AuditSink>,
}

impl FailoverDispatcher {
    pub fn new(error_log: Arc<dyn AuditSink>) -> Self {
        Self { error_log }
    }

    /// Try `call` with each credential in `pool` until one succeeds or a
    /// non-authorization failure stops the walk.
    pub async fn dispatch<F, Fut>(&self, pool: &CredentialPool, mut call: F) -> DispatchOutcome
    where
        F: FnMut(Credential) -> Fut,
        Fut: Future<Output = Result<String, ProviderFailure>>,
    {
        let provider = pool.provider().to_string();
        let mut outcome = DispatchOutcome::default();

        for (index, credential) in pool.iter().enumerate() {
            let slot = index + 1;
            match call(credential.clone()).await {
                Ok(content) => {
                    debug!(provider = %provider, credential_index = slot, "Provider call succeeded");
                    Telemetry::record_provider_attempt(&provider, "success");
                    outcome.trace.push(format!("Used {} key {}", provider, slot));
                    outcome.attempts.push(ProviderAttempt {
                        provider: provider.clone(),
                        credential_index: index,
                        outcome: AttemptOutcome::Success {
                            content: content.clone(),
                        },
                    });
                    outcome.content = Some(content);
                    outcome.succeeded_index = Some(index);
                    return outcome;
                }
                Err(failure) => {
                    warn!(
                        provider = %provider,
                        credential_index = slot,
                        kind = %failure.kind,
                        status = ?failure.status,
                        "Provider call failed: {}",
                        failure.message
                    );
                    Telemetry::record_provider_attempt(&provider, &failure.kind.to_string());
                    outcome
                        .trace
                        .push(format!("{} error (key {}): {}", provider, slot, failure.message));
                    self.log_failure(&provider, slot, credential, &failure).await;
                    outcome.errors.push(error_entry(&provider, slot, &failure));

                    let retryable = failure.is_retryable();
                    outcome.attempts.push(ProviderAttempt {
                        provider: provider.clone(),
                        credential_index: index,
                        outcome: AttemptOutcome::Failure(failure),
                    });
                    if !retryable {
                        break;
                    }
                }
            }
        }

        outcome
    }

    /// Dispatch `request` to one provider, running the persona leakage loop
    /// under each credential.
    pub async fn query(
        &self,
        provider: &ActiveProvider,
        generator: &PersonaGenerator,
        request: &ProviderRequest,
    ) -> DispatchOutcome {
        let client = &provider.client;
        self.dispatch(&provider.credentials, |credential| async move {
            generator
                .generate(client.name(), request, |next| {
                    let credential = credential.clone();
                    async move { client.call(&credential, &next).await }
                })
                .await
        })
        .await
    }

    async fn log_failure(
        &self,
        provider: &str,
        slot: usize,
        credential: &Credential,
        failure: &ProviderFailure,
    ) {
        let payload = json!({
            "credential": credential.expose(),
            "kind": failure.kind,
            "status": failure.status,
            "message": failure.message,
            "body": failure.raw_body,
        });
        let entry = AuditEntry::new(
            format!("{} API failure (key {})", provider, slot),
            serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string()),
        );
        if let Err(e) = self.error_log.record(entry).await {
            warn!(provider = %provider, "Failed to append to error log: {}", e);
        }
    }
}

fn error_entry(provider: &str, slot: usize, failure: &ProviderFailure) -> ErrorEntry {
    ErrorEntry {
        source: provider.to_string(),
        key: format!("KEY_{}", slot),
        kind: failure.kind,
        message: failure.message.clone(),
        status: failure.status,
        data: failure.raw_body.as_deref().map(|body| {
            serde_json::from_str::<Value>(body).unwrap_or_else(|_| Value::String(body.to_string()))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::FailureKind;
    use crate::infrastructure::audit_log::InMemoryAuditSink;

    fn pool(values: &[&str]) -> CredentialPool {
        CredentialPool::from_raw("OpenRouter", values.iter().map(|v| Some(*v)))
    }

    #[tokio::test]
    async fn test_first_credential_success() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let dispatcher = FailoverDispatcher::new(sink.clone());

        let outcome = dispatcher
            .dispatch(&pool(&["a", "b"]), |_| async { Ok("hello".to_string()) })
            .await;

        assert_eq!(outcome.content.as_deref(), Some("hello"));
        assert_eq!(outcome.succeeded_index, Some(0));
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.trace.lines(), &["Used OpenRouter key 1".to_string()]);
        assert!(outcome.errors.is_empty());
        assert!(sink.entries().is_empty());
    }

    #[tokio::test]
    async fn test_auth_failure_rotates_credentials() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let dispatcher = FailoverDispatcher::new(sink.clone());

        let outcome = dispatcher
            .dispatch(&pool(&["bad", "good"]), |credential| async move {
                if credential.expose() == "bad" {
                    Err(ProviderFailure::from_status(401, r#"{"error":"invalid key"}"#))
                } else {
                    Ok("ok".to_string())
                }
            })
            .await;

        assert_eq!(outcome.content.as_deref(), Some("ok"));
        assert_eq!(outcome.succeeded_index, Some(1));
        assert_eq!(outcome.attempts.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].key, "KEY_1");
        assert_eq!(outcome.errors[0].kind, FailureKind::Auth);
        assert_eq!(outcome.errors[0].data, Some(json!({"error": "invalid key"})));
        assert_eq!(
            outcome.trace.summary(),
            "OpenRouter error (key 1): HTTP 401 | Used OpenRouter key 2"
        );

        // The operator log keeps the raw credential; the caller-facing entry does not.
        let logged = sink.entries();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].context, "OpenRouter API failure (key 1)");
        assert!(logged[0].payload.contains("\"bad\""));
        assert!(!serde_json::to_string(&outcome.errors).unwrap().contains("\"bad\""));
    }

    #[tokio::test]
    async fn test_transport_failure_stops_walk() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let dispatcher = FailoverDispatcher::new(sink.clone());
        let mut calls = 0;

        let outcome = dispatcher
            .dispatch(&pool(&["a", "b", "c"]), |_| {
                calls += 1;
                async { Err(ProviderFailure::from_status(500, "upstream down")) }
            })
            .await;

        assert!(outcome.content.is_none());
        assert_eq!(calls, 1);
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.errors[0].data, Some(Value::String("upstream down".into())));
    }

    #[tokio::test]
    async fn test_empty_pool_makes_no_calls() {
        let dispatcher = FailoverDispatcher::new(Arc::new(InMemoryAuditSink::new()));
        let outcome = dispatcher
            .dispatch(&CredentialPool::default(), |_| async { Ok("never".to_string()) })
            .await;
        assert!(!outcome.is_success());
        assert!(outcome.attempts.is_empty());
    }
}
