// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for Vevo CLI

pub mod chat;
pub mod config;
pub mod learn;
pub mod self_edit;
pub mod status;

pub use self::config::ConfigCommand;
pub use self::learn::LearnCommand;

use anyhow::Result;
use tracing::debug;

use crate::daemon::{check_server_running, AssistantClient, ServerStatus};

/// Client for a running server, or `None` when commands should run embedded.
pub(crate) async fn server_client(host: &str, port: u16) -> Result<Option<AssistantClient>> {
    match check_server_running(host, port).await? {
        ServerStatus::Running { .. } => Ok(Some(AssistantClient::new(host, port)?)),
        status => {
            debug!("No healthy server at {}:{} ({:?}), running embedded", host, port, status);
            Ok(None)
        }
    }
}
