// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Append-only text logs (errors.log, self_edits.log, learning.log).

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::domain::audit::{AuditEntry, AuditSink};

/// File-backed sink. The parent directory is created on first write.
#[derive(Debug, Clone)]
pub struct AppendLog {
    path: PathBuf,
}

impl AppendLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Synchronous append, for callers that cannot await (panic hooks).
    pub fn record_blocking(&self, entry: &AuditEntry) -> std::io::Result<()> {
        use std::io::Write;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.render().as_bytes())?;
        file.flush()
    }
}

#[async_trait]
impl AuditSink for AppendLog {
    async fn record(&self, entry: AuditEntry) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.render().as_bytes()).await?;
        file.flush().await
    }

    async fn tail(&self, limit: usize) -> std::io::Result<Vec<String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let lines: Vec<String> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        let start = lines.len().saturating_sub(limit);
        Ok(lines[start..].to_vec())
    }
}

/// Captures entries in memory.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, entry: AuditEntry) -> std::io::Result<()> {
        self.entries.lock().push(entry);
        Ok(())
    }

    async fn tail(&self, limit: usize) -> std::io::Result<Vec<String>> {
        let lines: Vec<String> = self
            .entries
            .lock()
            .iter()
            .flat_map(|entry| {
                entry
                    .render()
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        let start = lines.len().saturating_sub(limit);
        Ok(lines[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_blocking_record_shares_the_file() {
        let dir = TempDir::new().unwrap();
        let log = AppendLog::new(dir.path().join("logs").join("errors.log"));

        log.record(AuditEntry::new("Provider failed", "timeout")).await.unwrap();
        log.record_blocking(&AuditEntry::new("Unhandled panic", "boom at main.rs:1"))
            .unwrap();

        let tail = log.tail(10).await.unwrap();
        assert_eq!(tail.len(), 4);
        assert!(tail[0].ends_with("] Provider failed"));
        assert!(tail[2].ends_with("] Unhandled panic"));
        assert_eq!(tail[3], "boom at main.rs:1");
    }

    #[tokio::test]
    async fn test_append_and_tail() {
        let dir = TempDir::new().unwrap();
        let log = AppendLog::new(dir.path().join("logs").join("learning.log"));

        assert!(log.tail(10).await.unwrap().is_empty());

        for i in 0..12 {
            log.record(AuditEntry::new(format!("Learning plan: {}", i), ""))
                .await
                .unwrap();
        }

        let tail = log.tail(10).await.unwrap();
        assert_eq!(tail.len(), 10);
        assert!(tail[0].ends_with("Learning plan: 2"));
        assert!(tail[9].ends_with("Learning plan: 11"));
    }

    #[tokio::test]
    async fn test_multiline_entries_are_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("errors.log");
        let log = AppendLog::new(&path);

        log.record(AuditEntry::new("OpenRouter API failure (key 1)", "HTTP 401"))
            .await
            .unwrap();
        log.record(AuditEntry::new("OpenRouter API failure (key 2)", "HTTP 500"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("API failure").count(), 2);
        assert!(content.contains("(key 1)\nHTTP 401\n\n["));
    }
}
