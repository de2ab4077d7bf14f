// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Persona Sanitizer Domain Service
//!
//! Everything the assistant says goes out under one persona. Upstream models
//! love to announce who built them, and occasionally echo a secret they were
//! handed. This module holds the declarative rule set that scrubs both, and
//! the leakage predicate that drives the bounded re-ask loop in
//! `crate::application::persona`.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements persona scrubbing and leakage detection

use regex::Regex;
use serde_json::Value;

/// Replacement used for anything that looks like an API key.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Default number of generation attempts before leaked content is accepted.
pub const DEFAULT_LEAKAGE_RETRY_BOUND: u32 = 3;

/// Who the assistant is when it speaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaProfile {
    pub name: String,
}

impl Default for PersonaProfile {
    fn default() -> Self {
        Self {
            name: "Jarvis".to_string(),
        }
    }
}

impl PersonaProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// System prompt shared by every chat and text generation call.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {name}, an independent assistant with deep domain knowledge. \
             Always speak as {name} (do not reveal or mention vendor names, model names, \
             or your providers). Use a confident but humble tone, provide concise reasoning \
             steps when asked, include provenance when you used external sources, and never \
             say you are \"an AI developed by\" another organization. When you cannot answer, \
             ask clarifying questions or offer to queue the question for learning.",
            name = self.name
        )
    }

    /// Extra instruction prepended to the prompt after a leaked reply.
    pub fn strict_instruction(&self) -> String {
        format!(
            "Please reply strictly as {} and do not include any provider or vendor names.",
            self.name
        )
    }

    /// Canned self-introduction used when no provider is configured.
    pub fn local_sample(&self) -> String {
        format!(
            "I am {} - a practical, inquisitive assistant. I focus on providing clear, \
             evidence-based answers and will ask clarifying questions when needed.",
            self.name
        )
    }
}

/// One ordered `(pattern, replacement)` rewrite.
#[derive(Debug, Clone)]
pub struct SanitizerRule {
    pattern: Regex,
    replacement: &'static str,
}

impl SanitizerRule {
    fn new(pattern: &str, replacement: &'static str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement,
        })
    }
}

const SCRUB_RULES: &[(&str, &str)] = &[
    (r"(?i)As an? language model[^.]*\.?", ""),
    (r"(?i)I am an? AI developed by [^.]*(\.|$)", ""),
    (r"(?i)As an AI[^.]*(\.|$)", ""),
    (r"(?i)I don't have the capability to[^.]*(\.|$)", ""),
    (r"(?i)\[object Object\]", "[object]"),
    (r"(?i)OpenAI", ""),
    (r"(?i)openrouter\.ai", ""),
    (r"(?i)HuggingFace", ""),
    (r"(?i)\bxAI\b", ""),
    (r"(?i)\bGoogle( AI)?\b", ""),
    (r"(?i)(sk-|api_|key=)[A-Za-z0-9_-]{16,}", REDACTION_MARKER),
];

const LEAK_PATTERNS: &[&str] = &[
    r"(?i)OpenAI|openrouter|HuggingFace|\bxAI\b|\bGoogle\b",
    r"(?i)I am an? AI",
];

/// Strips vendor self-identification and secret-like substrings from text.
#[derive(Debug, Clone)]
pub struct PersonaSanitizer {
    rules: Vec<SanitizerRule>,
    leak_patterns: Vec<Regex>,
}

impl PersonaSanitizer {
    /// Sanitizer with the built-in rule set.
    pub fn new() -> Self {
        let rules = SCRUB_RULES
            .iter()
            .map(|(pattern, replacement)| SanitizerRule::new(pattern, replacement))
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_default();
        let leak_patterns = LEAK_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            rules,
            leak_patterns,
        }
    }

    /// Sanitizer with caller-supplied rules, applied in order.
    pub fn with_rules(
        rules: &[(&str, &'static str)],
        leak_patterns: &[&str],
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            rules: rules
                .iter()
                .map(|(pattern, replacement)| SanitizerRule::new(pattern, replacement))
                .collect::<Result<_, _>>()?,
            leak_patterns: leak_patterns
                .iter()
                .map(|pattern| Regex::new(pattern))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Apply every rule until the text stops changing, then trim.
    ///
    /// Each rule either deletes its match or replaces it with a shorter
    /// marker, so every pass that changes the text also shortens it and the
    /// loop terminates. Running to a fixpoint makes `scrub` idempotent even
    /// when a deletion splices a new match together ("OpenOpenAIAI").
    pub fn scrub(&self, text: &str) -> String {
        let mut current = text.trim().to_string();
        loop {
            let next = self.apply_rules(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    /// Scrub an arbitrary JSON value. `null` passes through as `None`;
    /// non-string values are serialized first.
    pub fn scrub_value(&self, value: &Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(self.scrub(text)),
            other => Some(self.scrub(&other.to_string())),
        }
    }

    /// Whether raw provider output still identifies its vendor.
    pub fn detects_leakage(&self, raw: &str) -> bool {
        self.leak_patterns.iter().any(|pattern| pattern.is_match(raw))
    }

    fn apply_rules(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            if rule.pattern.is_match(&out) {
                out = rule.pattern.replace_all(&out, rule.replacement).into_owned();
            }
        }
        out.trim().to_string()
    }
}

impl Default for PersonaSanitizer {
    fn default() -> Self {
        Self::new()
    }
}
