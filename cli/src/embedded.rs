// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Embedded mode: build the assistant in-process when no server is running.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use vevo_core::application::Assistant;
use vevo_core::domain::config::AssistantConfigManifest;
use vevo_core::infrastructure::credentials::EnvCredentialSource;

/// Load configuration (discovery rules apply) and validate it.
pub fn load_config(config_path: Option<PathBuf>) -> Result<AssistantConfigManifest> {
    let config = AssistantConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

/// Build an [`Assistant`] reading credentials from the process environment.
pub async fn build_assistant(config: &AssistantConfigManifest) -> Result<Assistant> {
    let assistant = Assistant::from_config(config, &EnvCredentialSource)
        .await
        .context("Failed to initialize assistant")?;
    info!("Assistant initialized: {}", config.metadata.name);
    Ok(assistant)
}
