// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Provider Domain Interface (Anti-Corruption Layer)
//!
//! Every third-party completion or lookup service is reached through
//! [`ProviderClient`]. Adapters in `crate::infrastructure::llm` translate
//! vendor payloads into a plain `String` reply, and translate every vendor
//! failure into the single normalized [`ProviderFailure`] record before it
//! crosses into the application layer.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Defines the provider contract and failure taxonomy

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::credential::Credential;

/// What kind of call a provider answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderCapability {
    /// OpenAI-style `messages` in, `choices[0].message.content` out.
    ChatCompletion,
    /// Single prompt in, generated text out.
    TextInference,
    /// Structured data fetch; the reply is the JSON body as text.
    DataLookup,
}

impl fmt::Display for ProviderCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChatCompletion => write!(f, "chat-completion"),
            Self::TextInference => write!(f, "text-inference"),
            Self::DataLookup => write!(f, "data-lookup"),
        }
    }
}

/// Failure classes a provider call can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network error or non-auth HTTP error status.
    Transport,
    /// HTTP 401/403. The only class that moves on to the next credential.
    Auth,
    /// The call succeeded but carried no usable content.
    Content,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Auth => write!(f, "auth"),
            Self::Content => write!(f, "content"),
        }
    }
}

/// Normalized provider error, built once at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind} failure: {message}")]
pub struct ProviderFailure {
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub message: String,
    pub raw_body: Option<String>,
}

impl ProviderFailure {
    /// Classify a non-success HTTP response.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let kind = if status == 401 || status == 403 {
            FailureKind::Auth
        } else {
            FailureKind::Transport
        };

        Self {
            kind,
            status: Some(status),
            message: format!("HTTP {}", status),
            raw_body: Some(body.into()),
        }
    }

    /// Connection, DNS, TLS or timeout failure; no status is available.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            status: None,
            message: message.into(),
            raw_body: None,
        }
    }

    /// Successful response without extractable content.
    pub fn no_content(message: impl Into<String>, raw_body: Option<String>) -> Self {
        Self {
            kind: FailureKind::Content,
            status: None,
            message: message.into(),
            raw_body,
        }
    }

    /// Whether the dispatcher should try the next credential.
    pub fn is_retryable(&self) -> bool {
        self.kind == FailureKind::Auth
    }
}

/// One request to a provider: an optional system instruction plus user turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    pub system_prompt: Option<String>,
    pub user_turns: Vec<String>,
}

impl ProviderRequest {
    pub fn new(system_prompt: Option<String>, message: impl Into<String>) -> Self {
        Self {
            system_prompt,
            user_turns: vec![message.into()],
        }
    }

    /// Append a further user turn (e.g. the file under review).
    pub fn with_turn(mut self, turn: impl Into<String>) -> Self {
        self.user_turns.push(turn.into());
        self
    }

    /// Prefix the first user turn with an additional instruction.
    pub fn with_instruction(&self, instruction: &str) -> Self {
        let mut next = self.clone();
        match next.user_turns.first_mut() {
            Some(first) => *first = format!("{} {}", instruction, first),
            None => next.user_turns.push(instruction.to_string()),
        }
        next
    }

    /// All user turns joined, for providers that accept a single prompt.
    pub fn flattened(&self) -> String {
        let mut parts = Vec::with_capacity(self.user_turns.len() + 1);
        if let Some(system) = &self.system_prompt {
            parts.push(system.clone());
        }
        parts.extend(self.user_turns.iter().map(|turn| format!("User: {}", turn)));
        parts.join("\n")
    }
}

/// Issues exactly one network call per invocation.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Stable provider name used in traces, sources and error entries.
    fn name(&self) -> &str;

    fn capability(&self) -> ProviderCapability;

    async fn call(
        &self,
        credential: &Credential,
        request: &ProviderRequest,
    ) -> Result<String, ProviderFailure>;
}

/// Result of a single credential attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success { content: String },
    Failure(ProviderFailure),
}

/// One call against one credential. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderAttempt {
    pub provider: String,
    pub credential_index: usize,
    pub outcome: AttemptOutcome,
}

impl ProviderAttempt {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success { .. })
    }
}
