// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Credential sources: process environment (production) and a fixed map
// (tests, embedded CLI runs).

use std::collections::HashMap;

use crate::domain::credential::CredentialSource;

/// Reads credential slots from environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialSource;

impl CredentialSource for EnvCredentialSource {
    fn get(&self, slot: &str) -> Option<String> {
        std::env::var(slot).ok()
    }
}

/// Fixed slot -> value map.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialSource {
    values: HashMap<String, String>,
}

impl StaticCredentialSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, slot: impl Into<String>, value: impl Into<String>) {
        self.values.insert(slot.into(), value.into());
    }
}

impl CredentialSource for StaticCredentialSource {
    fn get(&self, slot: &str) -> Option<String> {
        self.values.get(slot).cloned()
    }
}
