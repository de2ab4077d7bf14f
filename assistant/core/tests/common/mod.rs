// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Shared test doubles: scripted providers and validators that record how
//! they were called.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use vevo_core::application::{ActiveProvider, FailoverDispatcher, PersonaGenerator};
use vevo_core::domain::audit::AuditSink;
use vevo_core::domain::credential::{Credential, CredentialPool};
use vevo_core::domain::file_store::{FileStore, FileStoreError};
use vevo_core::domain::persona::{PersonaProfile, PersonaSanitizer};
use vevo_core::domain::provider::{
    ProviderCapability, ProviderClient, ProviderFailure, ProviderRequest,
};
use vevo_core::domain::self_edit::{SyntaxValidator, ValidationVerdict};
use vevo_core::infrastructure::audit_log::InMemoryAuditSink;
use vevo_core::infrastructure::file_store::LocalFileStore;

/// One recorded provider call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub credential: String,
    pub request: ProviderRequest,
}

/// Provider that replays a fixed script of results, one per call. Once the
/// script runs out every further call fails with a transport error.
pub struct ScriptedProvider {
    name: String,
    capability: ProviderCapability,
    delay: Duration,
    script: Mutex<VecDeque<Result<String, ProviderFailure>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new(name: &str, script: Vec<Result<String, ProviderFailure>>) -> Self {
        Self {
            name: name.to_string(),
            capability: ProviderCapability::ChatCompletion,
            delay: Duration::ZERO,
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ProviderClient for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> ProviderCapability {
        self.capability
    }

    async fn call(
        &self,
        credential: &Credential,
        request: &ProviderRequest,
    ) -> Result<String, ProviderFailure> {
        self.calls.lock().push(RecordedCall {
            credential: credential.expose().to_string(),
            request: request.clone(),
        });
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| Err(ProviderFailure::network("script exhausted")))
    }
}

pub fn auth_failure() -> Result<String, ProviderFailure> {
    Err(ProviderFailure::from_status(401, r#"{"error":"invalid key"}"#))
}

pub fn server_failure() -> Result<String, ProviderFailure> {
    Err(ProviderFailure::from_status(500, "upstream exploded"))
}

pub fn reply(text: &str) -> Result<String, ProviderFailure> {
    Ok(text.to_string())
}

/// Wrap a scripted provider with `keys` credentials named `key-1..key-n`.
pub fn active(provider: &Arc<ScriptedProvider>, keys: usize) -> ActiveProvider {
    let raw: Vec<Option<String>> = (1..=keys).map(|i| Some(format!("key-{}", i))).collect();
    ActiveProvider::new(
        provider.clone(),
        CredentialPool::from_raw(provider.name(), raw),
    )
}

pub fn dispatcher() -> (Arc<FailoverDispatcher>, Arc<InMemoryAuditSink>) {
    let error_log = Arc::new(InMemoryAuditSink::new());
    let sink: Arc<dyn AuditSink> = error_log.clone();
    (Arc::new(FailoverDispatcher::new(sink)), error_log)
}

pub fn generator(bound: u32) -> Arc<PersonaGenerator> {
    Arc::new(
        PersonaGenerator::new(PersonaProfile::default(), Arc::new(PersonaSanitizer::new()))
            .with_bound(bound),
    )
}

/// Validator that returns a fixed verdict and records the paths it saw,
/// together with the file content at check time.
pub struct ScriptedValidator {
    verdict: ValidationVerdict,
    checked: Mutex<Vec<(PathBuf, Option<String>)>>,
}

impl ScriptedValidator {
    pub fn passing() -> Self {
        Self::with_verdict(ValidationVerdict::Pass)
    }

    pub fn failing(diagnostic: &str) -> Self {
        Self::with_verdict(ValidationVerdict::Fail(diagnostic.to_string()))
    }

    fn with_verdict(verdict: ValidationVerdict) -> Self {
        Self {
            verdict,
            checked: Mutex::new(Vec::new()),
        }
    }

    pub fn checked(&self) -> Vec<(PathBuf, Option<String>)> {
        self.checked.lock().clone()
    }
}

#[async_trait]
impl SyntaxValidator for ScriptedValidator {
    async fn check(&self, path: &Path) -> ValidationVerdict {
        let content = std::fs::read_to_string(path).ok();
        self.checked.lock().push((path.to_path_buf(), content));
        self.verdict.clone()
    }
}

/// Which operation a [`FaultyFileStore`] refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Write,
    Rename,
    Delete,
}

/// Local file store that fails one kind of operation and records every
/// path it was asked to delete.
pub struct FaultyFileStore {
    inner: LocalFileStore,
    fault: Fault,
    deletes: Mutex<Vec<PathBuf>>,
}

impl FaultyFileStore {
    pub fn new(fault: Fault) -> Self {
        Self {
            inner: LocalFileStore::new(),
            fault,
            deletes: Mutex::new(Vec::new()),
        }
    }

    pub fn deletes(&self) -> Vec<PathBuf> {
        self.deletes.lock().clone()
    }

    fn refuse(&self, op: Fault, path: &Path) -> Result<(), FileStoreError> {
        if self.fault == op {
            return Err(FileStoreError::Io {
                path: path.display().to_string(),
                message: format!("{:?} refused", op),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for FaultyFileStore {
    async fn read_to_string(&self, path: &Path) -> Result<String, FileStoreError> {
        self.inner.read_to_string(path).await
    }

    async fn write(&self, path: &Path, contents: &str) -> Result<(), FileStoreError> {
        self.refuse(Fault::Write, path)?;
        self.inner.write(path, contents).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FileStoreError> {
        self.refuse(Fault::Rename, from)?;
        self.inner.rename(from, to).await
    }

    async fn delete(&self, path: &Path) -> Result<(), FileStoreError> {
        self.deletes.lock().push(path.to_path_buf());
        self.refuse(Fault::Delete, path)?;
        self.inner.delete(path).await
    }

    async fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path).await
    }
}
