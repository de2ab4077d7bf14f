// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Chat turn records and the response handed back to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Monotonic record identifier derived from the creation time in
/// milliseconds. Two records created in the same millisecond still get
/// distinct, increasing ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn next() -> Self {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut last = LAST_ID.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match LAST_ID.compare_exchange_weak(last, candidate, Ordering::SeqCst, Ordering::Relaxed) {
                Ok(_) => return Self(candidate),
                Err(observed) => last = observed,
            }
        }
    }
}

/// One answered chat message. Never mutated after it is appended to memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub id: RecordId,
    #[serde(default = "default_task_type")]
    pub task_type: String,
    /// The user message.
    pub payload: String,
    /// The synthesized reply.
    pub response: String,
    pub confidence: f64,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub is_fallback: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_task_type() -> String {
    "chat".to_string()
}

impl ChatTurn {
    pub fn new(
        message: impl Into<String>,
        reply: impl Into<String>,
        confidence: f64,
        sources: Vec<String>,
        is_fallback: bool,
    ) -> Self {
        Self {
            id: RecordId::next(),
            task_type: default_task_type(),
            payload: message.into(),
            response: reply.into(),
            confidence,
            sources,
            is_fallback,
            created_at: Utc::now(),
        }
    }
}

/// A provider failure as reported to the caller in `errors`.
///
/// Carries the credential slot label (`KEY_1`, `KEY_2`, ...) but never the
/// credential itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub source: String,
    pub key: String,
    pub kind: crate::domain::provider::FailureKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Ordered, human-readable account of how a reply was produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReasoningTrace(Vec<String>);

impl ReasoningTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }

    pub fn extend(&mut self, other: ReasoningTrace) {
        self.0.extend(other.0);
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn summary(&self) -> String {
        self.0.join(" | ")
    }
}

/// Structured result of `handleChat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub sources: Vec<String>,
    pub reasoning_summary: String,
    pub confidence: f64,
    pub memory_update: bool,
    pub errors: Vec<ErrorEntry>,
    #[serde(rename = "isFallback")]
    pub is_fallback: bool,
}
