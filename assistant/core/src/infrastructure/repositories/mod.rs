// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository abstractions defined in
//! the domain layer.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve conversational memory and the learning queue
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## JSON File Repositories
//!
//! - **JsonFileMemoryStore** - whole-store JSON document, rewritten on every append
//! - **JsonFileLearningQueue** - JSON array of queued items, rewritten on every enqueue
//!
//! ## In-Memory Repositories
//!
//! Lightweight implementations for testing and development:
//! - **InMemoryMemoryRepository**
//! - **InMemoryLearningQueue**

pub mod json_file;

pub use json_file::{JsonFileLearningQueue, JsonFileMemoryStore};

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::domain::chat::ChatTurn;
use crate::domain::learning::QueuedLearningItem;
use crate::domain::memory::MemoryState;
use crate::domain::repository::{LearningQueueRepository, MemoryRepository, RepositoryError};

#[derive(Clone, Default)]
pub struct InMemoryMemoryRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: MemoryState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }
}

#[async_trait]
impl MemoryRepository for InMemoryMemoryRepository {
    async fn append(&self, turn: ChatTurn) -> Result<(), RepositoryError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| RepositoryError::Io(format!("Lock poisoned: {}", e)))?;
        state.push(turn);
        Ok(())
    }

    async fn snapshot(&self) -> MemoryState {
        self.state
            .read()
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    async fn turn_count(&self) -> usize {
        self.state
            .read()
            .map(|state| state.turn_count())
            .unwrap_or(0)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryLearningQueue {
    items: Arc<RwLock<Vec<QueuedLearningItem>>>,
}

impl InMemoryLearningQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LearningQueueRepository for InMemoryLearningQueue {
    async fn enqueue(&self, item: QueuedLearningItem) -> Result<(), RepositoryError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| RepositoryError::Io(format!("Lock poisoned: {}", e)))?;
        items.push(item);
        Ok(())
    }

    async fn list(&self) -> Vec<QueuedLearningItem> {
        self.items
            .read()
            .map(|items| items.clone())
            .unwrap_or_default()
    }
}
