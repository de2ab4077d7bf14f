// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Persisted conversational memory: the personality tag plus every turn.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::chat::ChatTurn;

pub const DEFAULT_PERSONALITY: &str = "friendly";

/// Whole-store snapshot. Written out in full after every append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryState {
    #[serde(default = "default_personality")]
    pub personality: String,
    #[serde(default)]
    pub learned_responses: Vec<MemoryRecord>,
}

/// One entry of `learnedResponses`. Entries that are not chat turns (for
/// example `taskType: "adaptive"` records) are carried through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemoryRecord {
    Turn(ChatTurn),
    Other(Value),
}

impl MemoryRecord {
    pub fn as_turn(&self) -> Option<&ChatTurn> {
        match self {
            Self::Turn(turn) => Some(turn),
            Self::Other(_) => None,
        }
    }
}

impl From<ChatTurn> for MemoryRecord {
    fn from(turn: ChatTurn) -> Self {
        Self::Turn(turn)
    }
}

fn default_personality() -> String {
    DEFAULT_PERSONALITY.to_string()
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            personality: default_personality(),
            learned_responses: Vec::new(),
        }
    }
}

impl MemoryState {
    pub fn with_personality(personality: impl Into<String>) -> Self {
        Self {
            personality: personality.into(),
            learned_responses: Vec::new(),
        }
    }

    /// Number of stored records, chat turns and carried-through entries alike.
    pub fn turn_count(&self) -> usize {
        self.learned_responses.len()
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.learned_responses.push(turn.into());
    }

    pub fn turns(&self) -> impl Iterator<Item = &ChatTurn> {
        self.learned_responses.iter().filter_map(MemoryRecord::as_turn)
    }
}
