// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Counters emitted through the `metrics` facade. Without an installed
//! recorder every call is a no-op.

use metrics::counter;

pub struct Telemetry;

impl Telemetry {
    pub fn record_provider_attempt(provider: &str, outcome: &str) {
        counter!(
            "vevo_provider_attempts_total",
            "provider" => provider.to_string(),
            "outcome" => outcome.to_string()
        )
        .increment(1);
    }

    pub fn record_chat_turn(is_fallback: bool) {
        counter!("vevo_chat_turns_total", "fallback" => is_fallback.to_string()).increment(1);
    }

    pub fn record_self_edit(outcome: &str) {
        counter!("vevo_self_edits_total", "outcome" => outcome.to_string()).increment(1);
    }

    pub fn record_persona_retry(provider: &str) {
        counter!("vevo_persona_retries_total", "provider" => provider.to_string()).increment(1);
    }
}
