// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! JSON File Repositories
//!
//! Each store keeps its whole structure in memory behind an async mutex and
//! rewrites the backing file on every mutation. The mutex is held across the
//! write, so interleaved appends are persisted in call order and none is lost.
//!
//! Writes go to a sibling `.tmp` file that is then renamed over the target,
//! so a crash mid-write leaves the previous document intact.
//!
//! Loading is never fatal: a missing file yields the empty default, and an
//! unreadable or corrupt file is logged and also yields the empty default.
//! A corrupt file is first renamed to `<name>.corrupt-<millis>` so the next
//! write cannot destroy it.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::chat::ChatTurn;
use crate::domain::learning::QueuedLearningItem;
use crate::domain::memory::MemoryState;
use crate::domain::repository::{LearningQueueRepository, MemoryRepository, RepositoryError};

pub struct JsonFileMemoryStore {
    path: PathBuf,
    state: Mutex<MemoryState>,
}

impl JsonFileMemoryStore {
    /// Load the store at `path`. `personality` is used when nothing usable
    /// is on disk.
    pub async fn load(path: impl Into<PathBuf>, personality: &str) -> Self {
        let path = path.into();
        let state = load_or_default(&path, || MemoryState::with_personality(personality)).await;
        debug!(path = %path.display(), turns = state.turn_count(), "Memory store loaded");
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MemoryRepository for JsonFileMemoryStore {
    async fn append(&self, turn: ChatTurn) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state.push(turn);
        // The turn stays in memory when the flush fails; the next
        // successful append writes it out.
        write_atomic(&self.path, &*state).await
    }

    async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    async fn turn_count(&self) -> usize {
        self.state.lock().await.turn_count()
    }
}

pub struct JsonFileLearningQueue {
    path: PathBuf,
    items: Mutex<Vec<QueuedLearningItem>>,
}

impl JsonFileLearningQueue {
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = load_or_default(&path, Vec::new).await;
        Self {
            path,
            items: Mutex::new(items),
        }
    }
}

#[async_trait]
impl LearningQueueRepository for JsonFileLearningQueue {
    async fn enqueue(&self, item: QueuedLearningItem) -> Result<(), RepositoryError> {
        let mut items = self.items.lock().await;
        items.push(item);
        write_atomic(&self.path, &*items).await
    }

    async fn list(&self) -> Vec<QueuedLearningItem> {
        self.items.lock().await.clone()
    }
}

async fn load_or_default<T, F>(path: &Path, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path.display(), "Corrupt store, starting empty: {}", e);
                set_aside(path).await;
                default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => default(),
        Err(e) => {
            warn!(path = %path.display(), "Unreadable store, starting empty: {}", e);
            default()
        }
    }
}

async fn set_aside(path: &Path) {
    let mut target = path.as_os_str().to_os_string();
    target.push(format!(".corrupt-{}", chrono::Utc::now().timestamp_millis()));
    let target = PathBuf::from(target);

    match tokio::fs::rename(path, &target).await {
        Ok(()) => warn!(path = %path.display(), moved_to = %target.display(), "Corrupt store moved aside"),
        Err(e) => warn!(path = %path.display(), "Failed to move corrupt store aside: {}", e),
    }
}

async fn write_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), RepositoryError> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
