// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Append-only operator logs.
//!
//! Three durable logs exist: provider errors, self-edit audit entries and
//! learning-review results. They are plain text meant for operators, written
//! through [`AuditSink`] so tests can capture entries in memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub context: String,
    pub payload: String,
}

impl AuditEntry {
    pub fn new(context: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            context: context.into(),
            payload: payload.into(),
        }
    }

    /// `[timestamp] context` followed by the payload and a blank line.
    pub fn render(&self) -> String {
        if self.payload.is_empty() {
            format!("[{}] {}\n", self.timestamp.to_rfc3339(), self.context)
        } else {
            format!(
                "[{}] {}\n{}\n\n",
                self.timestamp.to_rfc3339(),
                self.context,
                self.payload
            )
        }
    }
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append an entry. Failures are reported, never retried.
    async fn record(&self, entry: AuditEntry) -> std::io::Result<()>;

    /// Up to `limit` most recent rendered lines.
    async fn tail(&self, limit: usize) -> std::io::Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_formats() {
        let entry = AuditEntry::new("OpenRouter API failure (key 1)", "HTTP 401");
        let rendered = entry.render();
        assert!(rendered.starts_with('['));
        assert!(rendered.contains("] OpenRouter API failure (key 1)\nHTTP 401\n\n"));

        let bare = AuditEntry::new("Code updated for a.js", "").render();
        assert!(bare.ends_with("] Code updated for a.js\n"));
    }
}
