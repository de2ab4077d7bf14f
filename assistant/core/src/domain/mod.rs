// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: pure types, rules and the contracts infrastructure fulfils.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Owns every business rule; no I/O lives here

pub mod arithmetic;
pub mod audit;
pub mod chat;
pub mod confidence;
pub mod config;
pub mod credential;
pub mod file_store;
pub mod guardrail;
pub mod learning;
pub mod memory;
pub mod persona;
pub mod provider;
pub mod repository;
pub mod self_edit;
