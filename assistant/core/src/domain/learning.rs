// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Learning queue items and review plans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chat::{ErrorEntry, RecordId};
use super::file_store::FileStoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStatus {
    Queued,
    InReview,
    Learned,
    Dismissed,
}

/// A low-confidence turn waiting for out-of-band research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedLearningItem {
    pub id: RecordId,
    pub message: String,
    /// Providers attempted for the turn, in dispatch order.
    pub sources: Vec<String>,
    pub errors: Vec<ErrorEntry>,
    pub timestamp: DateTime<Utc>,
    pub status: LearningStatus,
}

impl QueuedLearningItem {
    pub fn new(message: impl Into<String>, sources: Vec<String>, errors: Vec<ErrorEntry>) -> Self {
        Self {
            id: RecordId::next(),
            message: message.into(),
            sources,
            errors,
            timestamp: Utc::now(),
            status: LearningStatus::Queued,
        }
    }
}

/// Result of a learning review: the parsed plan, or the raw reply when it
/// was not valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LearningPlan {
    Malformed {
        error: String,
        #[serde(rename = "rawContent")]
        raw_content: String,
    },
    Structured(serde_json::Value),
}

impl LearningPlan {
    pub fn from_reply(raw: &str) -> Self {
        let candidate = strip_code_fence(raw);
        match serde_json::from_str::<serde_json::Value>(candidate) {
            Ok(value) => Self::Structured(value),
            Err(_) => Self::Malformed {
                error: "Malformed JSON".to_string(),
                raw_content: raw.to_string(),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LearningReviewError {
    #[error("Learning review skipped: no credential configured")]
    NotConfigured,

    #[error("No content returned")]
    NoContent,

    #[error("Failed to serialize: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to store learning plan: {0}")]
    Storage(#[from] FileStoreError),
}

/// Contents of a ```` ```lang ... ``` ```` block, or the trimmed input.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body_start) = rest.find('\n') else {
        return trimmed;
    };
    let body = &rest[body_start + 1..];
    match body.rfind("```") {
        Some(end) => body[..end].trim_end_matches(['\n', '\r']),
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_parses_json() {
        let plan = LearningPlan::from_reply(r#"{"topics": ["tides"]}"#);
        assert_eq!(plan, LearningPlan::Structured(json!({"topics": ["tides"]})));
    }

    #[test]
    fn test_plan_parses_fenced_json() {
        let plan = LearningPlan::from_reply("```json\n{\"topics\": []}\n```");
        assert_eq!(plan, LearningPlan::Structured(json!({"topics": []})));
    }

    #[test]
    fn test_plan_keeps_raw_content_when_malformed() {
        let plan = LearningPlan::from_reply("study tides next");
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["error"], "Malformed JSON");
        assert_eq!(value["rawContent"], "study tides next");
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```rust\nfn main() {}\n```"), "fn main() {}");
        assert_eq!(strip_code_fence("  plain  "), "plain");
        assert_eq!(strip_code_fence("```unterminated\nx"), "```unterminated\nx");
    }

    #[test]
    fn test_new_item_is_queued() {
        let item = QueuedLearningItem::new("why?", vec!["OpenRouter".into()], vec![]);
        assert_eq!(item.status, LearningStatus::Queued);
        assert_eq!(serde_json::to_value(&item).unwrap()["status"], "queued");
    }
}
