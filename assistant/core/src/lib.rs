// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # vevo-core
//!
//! Conversational backend core: fans a user message out to external
//! completion providers, reconciles the answers into one persona-safe reply,
//! remembers every turn, and can rewrite its own source files through a
//! validate-then-commit pipeline.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Re-exports the domain, application, infrastructure and
//!   presentation layers

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
