// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Confidence Engine
//!
//! Turns the sanitized replies gathered for one chat turn into a single
//! synthesized reply plus a scalar confidence, and decides when the turn is
//! a fallback that should be answered with a clarification offer and queued
//! for learning instead.

use regex::Regex;

/// Reply sent when no provider produced a usable answer.
pub const CLARIFICATION_REPLY: &str = "I don't have a high-confidence answer yet. Would you like me to (A) clarify, (B) ask external sources, or (C) queue this for learning and return later?";

/// Confidence reported for fallback turns.
pub const FALLBACK_CONFIDENCE: f64 = 0.2;

/// Separator between replies from different sources.
pub const REPLY_SEPARATOR: &str = " | ";

const REFUSAL_PATTERN: &str = r"As a language AI model|I am an AI developed by OpenAI|I can't";

/// Policy knobs for the non-fallback confidence curve.
#[derive(Debug, Clone)]
pub struct ConfidencePolicy {
    /// Confidence for a single contributing source.
    pub base: f64,
    /// Gain from the second source. The total gain approaches
    /// `2 * first_increment` as sources grow.
    pub first_increment: f64,
    refusal: Option<Regex>,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            base: 0.8,
            first_increment: 0.1,
            refusal: Regex::new(REFUSAL_PATTERN).ok(),
        }
    }
}

/// Outcome of assessing one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub reply: String,
    pub confidence: f64,
    pub is_fallback: bool,
}

impl ConfidencePolicy {
    /// Synthesize the reply for a turn from its non-empty sanitized replies.
    pub fn assess(&self, replies: &[String]) -> Assessment {
        let contributing: Vec<&str> = replies
            .iter()
            .map(String::as_str)
            .filter(|reply| !reply.trim().is_empty())
            .collect();
        let reply = contributing.join(REPLY_SEPARATOR);

        if reply.is_empty() || self.is_refusal(&reply) {
            return Assessment {
                reply: CLARIFICATION_REPLY.to_string(),
                confidence: FALLBACK_CONFIDENCE,
                is_fallback: true,
            };
        }

        Assessment {
            reply,
            confidence: self.confidence_for(contributing.len()),
            is_fallback: false,
        }
    }

    /// `base + 2 * inc * n / (n + 1)` with `n = sources - 1`, clamped to
    /// `[0, 1]`.
    ///
    /// With the default policy, one source gives 0.8 and two give 0.9. The
    /// step between `n` and `n + 1` shrinks like `1 / n^2`, so successive
    /// values stay distinct in `f64` up to roughly ten million sources;
    /// beyond that the curve is flat but never decreases.
    pub fn confidence_for(&self, sources: usize) -> f64 {
        if sources == 0 {
            return 0.0;
        }
        let extra = (sources - 1) as f64;
        let gain = 2.0 * self.first_increment * extra / (extra + 1.0);
        (self.base + gain).clamp(0.0, 1.0)
    }

    fn is_refusal(&self, reply: &str) -> bool {
        self.refusal
            .as_ref()
            .map(|pattern| pattern.is_match(reply))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_replies_are_fallback() {
        let policy = ConfidencePolicy::default();
        let assessment = policy.assess(&[]);
        assert!(assessment.is_fallback);
        assert_eq!(assessment.reply, CLARIFICATION_REPLY);
        assert_eq!(assessment.confidence, FALLBACK_CONFIDENCE);

        let blanks = policy.assess(&["".to_string(), "   ".to_string()]);
        assert!(blanks.is_fallback);
    }

    #[test]
    fn test_refusal_is_fallback() {
        let policy = ConfidencePolicy::default();
        let assessment = policy.assess(&["Sorry, I can't help with that.".to_string()]);
        assert!(assessment.is_fallback);
        assert_eq!(assessment.confidence, 0.2);
    }

    #[test]
    fn test_replies_are_joined_in_order() {
        let policy = ConfidencePolicy::default();
        let assessment = policy.assess(&["Math result: 4".to_string(), "Four.".to_string()]);
        assert!(!assessment.is_fallback);
        assert_eq!(assessment.reply, "Math result: 4 | Four.");
    }

    #[test]
    fn test_confidence_curve() {
        let policy = ConfidencePolicy::default();
        assert!((policy.confidence_for(1) - 0.8).abs() < 1e-9);
        assert!((policy.confidence_for(2) - 0.9).abs() < 1e-9);

        let mut previous = policy.confidence_for(1);
        for sources in 2..=10_000 {
            let current = policy.confidence_for(sources);
            assert!(current > previous, "not increasing at {}", sources);
            assert!(current < 1.0);
            previous = current;
        }

        let million = policy.confidence_for(1_000_000);
        assert!(policy.confidence_for(1_000_001) > million);
        assert!(million < 1.0);
        assert!(policy.confidence_for(usize::MAX) <= 1.0);
        assert!(policy.confidence_for(usize::MAX) >= million);
    }
}
