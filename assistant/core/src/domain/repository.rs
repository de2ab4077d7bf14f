// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for the two process-wide stores: conversational
//! memory and the learning queue. Both are append-only from the point of
//! view of request handlers, and both flush the entire structure on every
//! append so a crash loses at most the in-flight request.
//!
//! | Trait | Record | Implementations |
//! |-------|--------|----------------|
//! | `MemoryRepository` | `ChatTurn` | `InMemoryMemoryRepository`, `JsonFileMemoryStore` |
//! | `LearningQueueRepository` | `QueuedLearningItem` | `InMemoryLearningQueue`, `JsonFileLearningQueue` |
//!
//! Appends are ordered by call order, not by timestamp. A single writer
//! process is assumed; two processes sharing the same backing file is
//! unsupported (last writer wins).

use async_trait::async_trait;

use super::chat::ChatTurn;
use super::learning::QueuedLearningItem;
use super::memory::MemoryState;

#[async_trait]
pub trait MemoryRepository: Send + Sync {
    /// Append a turn and persist the whole store before returning.
    async fn append(&self, turn: ChatTurn) -> Result<(), RepositoryError>;

    /// Copy of the current store.
    async fn snapshot(&self) -> MemoryState;

    async fn turn_count(&self) -> usize;
}

#[async_trait]
pub trait LearningQueueRepository: Send + Sync {
    /// Append an item and persist the whole queue before returning.
    async fn enqueue(&self, item: QueuedLearningItem) -> Result<(), RepositoryError>;

    async fn list(&self) -> Vec<QueuedLearningItem>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
