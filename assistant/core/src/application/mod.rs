// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod assistant;
pub mod chat;
pub mod dispatcher;
pub mod learning_review;
pub mod persona;
pub mod self_edit;

// Re-export use cases for convenience
pub use assistant::Assistant;
pub use chat::{ChatService, PersonaProbe};
pub use dispatcher::{ActiveProvider, DispatchOutcome, FailoverDispatcher};
pub use learning_review::{LearningReviewService, LearningStatusReport};
pub use persona::PersonaGenerator;
pub use self_edit::SelfEditPipeline;
