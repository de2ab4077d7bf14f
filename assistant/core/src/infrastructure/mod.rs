// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod audit_log;
pub mod credentials;
pub mod file_store;
pub mod llm;
pub mod repositories;
pub mod telemetry;
pub mod validator;
