// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Local Filesystem File Store
//!
//! `FileStore` over `tokio::fs`. `rename` is a same-directory rename in every
//! caller, which POSIX guarantees to be atomic.

use async_trait::async_trait;
use std::path::Path;

use crate::domain::file_store::{FileStore, FileStoreError};

#[derive(Debug, Clone, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn read_to_string(&self, path: &Path) -> Result<String, FileStoreError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FileStoreError::from_io(path, e))
    }

    async fn write(&self, path: &Path, contents: &str) -> Result<(), FileStoreError> {
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| FileStoreError::from_io(path, e))
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FileStoreError> {
        tokio::fs::rename(from, to)
            .await
            .map_err(|e| FileStoreError::from_io(from, e))
    }

    async fn delete(&self, path: &Path) -> Result<(), FileStoreError> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| FileStoreError::from_io(path, e))
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}
