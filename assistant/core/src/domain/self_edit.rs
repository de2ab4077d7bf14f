// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Self-Edit Domain Model
//!
//! A self-edit moves through
//! `Idle -> Requesting -> Validating -> {Committed | RolledBack}`.
//! The candidate file exists on disk only while `Validating`; both terminal
//! states leave no sibling file behind.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Defines the edit state machine, candidate and validator contract

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::file_store::FileStoreError;

/// Default suffix appended to the target path for the candidate file.
pub const DEFAULT_CANDIDATE_SUFFIX: &str = ".candidate.js";

/// Persona instruction sent as the system prompt for every rewrite.
pub const SELF_EDIT_SYSTEM_PROMPT: &str = "You are a safe self-modifying assistant.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditState {
    Idle,
    Requesting,
    Validating,
    Committed,
    RolledBack,
}

impl EditState {
    /// Legal forward transitions. `Requesting -> RolledBack` covers the
    /// "no content returned" path.
    pub fn can_transition_to(self, next: EditState) -> bool {
        matches!(
            (self, next),
            (EditState::Idle, EditState::Requesting)
                | (EditState::Requesting, EditState::Validating)
                | (EditState::Requesting, EditState::RolledBack)
                | (EditState::Validating, EditState::Committed)
                | (EditState::Validating, EditState::RolledBack)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, EditState::Committed | EditState::RolledBack)
    }
}

impl fmt::Display for EditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EditState::Idle => "idle",
            EditState::Requesting => "requesting",
            EditState::Validating => "validating",
            EditState::Committed => "committed",
            EditState::RolledBack => "rolled_back",
        };
        f.write_str(label)
    }
}

/// Where a proposed rewrite came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditProvenance {
    pub feedback: String,
    pub requested_at: DateTime<Utc>,
}

/// Unvalidated rewrite of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCandidate {
    pub target: PathBuf,
    pub content: String,
    pub provenance: EditProvenance,
}

impl EditCandidate {
    /// Sibling path the candidate is written to before validation.
    pub fn sibling_path(&self, suffix: &str) -> PathBuf {
        candidate_path(&self.target, suffix)
    }
}

/// `target` with `suffix` appended to its full file name.
pub fn candidate_path(target: &Path, suffix: &str) -> PathBuf {
    let mut raw = target.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Outcome of an external syntax check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    Pass,
    Fail(String),
}

#[async_trait]
pub trait SyntaxValidator: Send + Sync {
    async fn check(&self, path: &Path) -> ValidationVerdict;
}

/// Successful self-edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditReceipt {
    pub target: PathBuf,
    pub committed_at: DateTime<Utc>,
    pub provider: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SelfEditError {
    /// No credential configured; nothing was requested or written.
    #[error("Self-edit skipped: no credential configured")]
    NotConfigured,

    #[error("Target file is not readable: {0}")]
    Unreadable(#[source] FileStoreError),

    #[error("No content returned")]
    NoContent,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Candidate could not be committed: {0}")]
    Storage(#[source] FileStoreError),
}

impl SelfEditError {
    /// State the pipeline stopped in for this error.
    pub fn final_state(&self) -> EditState {
        match self {
            SelfEditError::NotConfigured | SelfEditError::Unreadable(_) => EditState::Idle,
            _ => EditState::RolledBack,
        }
    }
}
