// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Provider credentials and the ordered pool they are tried from.
//!
//! Raw credential values arrive from the environment (or any other
//! [`CredentialSource`]) and routinely carry junk: a UTF-8 byte-order mark
//! from a Windows-edited `.env`, a trailing newline, a zero-width space
//! pasted from a dashboard. [`CredentialPool::normalize`] strips all of it,
//! and empty slots never make it into the pool.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements credential normalization and preference order

use std::fmt;

/// Characters that are invisible in a terminal but break an `Authorization`
/// header: BOM, zero-width space/joiners and the word joiner.
const INVISIBLE: [char; 5] = ['\u{feff}', '\u{200b}', '\u{200c}', '\u{200d}', '\u{2060}'];

/// Opaque secret authorizing calls to one provider.
///
/// `Debug` and `Display` never print the value; call [`Credential::expose`]
/// at the exact point the secret is put on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap an already-normalized value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Named-slot lookup for raw credential strings (e.g. `OPENROUTER_API_KEY_1`).
pub trait CredentialSource: Send + Sync {
    /// Raw value for `slot`, or `None` when the slot is absent.
    fn get(&self, slot: &str) -> Option<String>;
}

/// Ordered, normalized credentials for one provider.
#[derive(Debug, Clone, Default)]
pub struct CredentialPool {
    provider: String,
    credentials: Vec<Credential>,
}

impl CredentialPool {
    /// Build a pool from raw values in preference order. Absent and empty
    /// entries are dropped after normalization.
    pub fn from_raw<I, S>(provider: impl Into<String>, raw: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let credentials = raw
            .into_iter()
            .flatten()
            .filter_map(|value| Self::normalize(value.as_ref()))
            .map(Credential)
            .collect();

        Self {
            provider: provider.into(),
            credentials,
        }
    }

    /// Resolve `slots` against a source, keeping slot order as preference order.
    pub fn resolve(
        provider: impl Into<String>,
        slots: &[String],
        source: &dyn CredentialSource,
    ) -> Self {
        Self::from_raw(provider, slots.iter().map(|slot| source.get(slot)))
    }

    /// Strip byte-order marks, zero-width characters and every whitespace
    /// character. Returns `None` when nothing is left.
    pub fn normalize(raw: &str) -> Option<String> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && !INVISIBLE.contains(c))
            .collect();

        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.iter()
    }

    pub fn first(&self) -> Option<&Credential> {
        self.credentials.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapSource(HashMap<String, String>);

    impl CredentialSource for MapSource {
        fn get(&self, slot: &str) -> Option<String> {
            self.0.get(slot).cloned()
        }
    }

    #[test]
    fn test_normalize_strips_bom_and_whitespace() {
        assert_eq!(
            CredentialPool::normalize("\u{feff}sk-abc 123\n").as_deref(),
            Some("sk-abc123")
        );
        assert_eq!(
            CredentialPool::normalize("\tkey\u{200b}value\r\n").as_deref(),
            Some("keyvalue")
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["\u{feff} a b c ", "plain", "  ", "\u{2060}x\u{200d}y"] {
            let once = CredentialPool::normalize(raw);
            let twice = once.as_deref().and_then(CredentialPool::normalize);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_pool_drops_absent_and_empty_entries() {
        let pool = CredentialPool::from_raw(
            "openrouter",
            vec![None, Some("  "), Some("\u{feff}"), Some("first"), None, Some(" second ")],
        );

        let values: Vec<&str> = pool.iter().map(Credential::expose).collect();
        assert_eq!(values, vec!["first", "second"]);
        assert_eq!(pool.provider(), "openrouter");
    }

    #[test]
    fn test_resolve_keeps_slot_order() {
        let source = MapSource(HashMap::from([
            ("KEY_2".to_string(), "two".to_string()),
            ("KEY_1".to_string(), "one".to_string()),
        ]));
        let slots = vec!["KEY_1".to_string(), "KEY_MISSING".to_string(), "KEY_2".to_string()];

        let pool = CredentialPool::resolve("p", &slots, &source);
        let values: Vec<&str> = pool.iter().map(Credential::expose).collect();
        assert_eq!(values, vec!["one", "two"]);
    }

    #[test]
    fn test_debug_never_prints_secret() {
        let credential = Credential::new("sk-very-secret");
        assert!(!format!("{:?}", credential).contains("secret"));
        assert!(!credential.to_string().contains("secret"));
    }
}
