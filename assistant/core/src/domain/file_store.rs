// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Whole-file storage contract used by the self-edit pipeline and the
//! learning review. Every operation is complete from the caller's point of
//! view: no partial write is ever observable.

use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

impl FileStoreError {
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.display().to_string())
        } else {
            Self::Io {
                path: path.display().to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn read_to_string(&self, path: &Path) -> Result<String, FileStoreError>;

    async fn write(&self, path: &Path, contents: &str) -> Result<(), FileStoreError>;

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FileStoreError>;

    async fn delete(&self, path: &Path) -> Result<(), FileStoreError>;

    async fn exists(&self, path: &Path) -> bool;
}
