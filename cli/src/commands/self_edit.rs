// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `vevo self-edit`
//!
//! Applies the same guardrail as `POST /api/self-edit` before anything is
//! requested.

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::server_client;
use crate::embedded::{build_assistant, load_config};

pub async fn handle_command(
    file: &str,
    feedback: &str,
    config_path: Option<PathBuf>,
    host: &str,
    port: u16,
) -> Result<()> {
    if let Some(client) = server_client(host, port).await? {
        let body = client.self_edit(file, feedback).await?;
        if body["success"].as_bool().unwrap_or(false) {
            println!("{}", format!("✓ Updated {}", file).green());
        } else {
            println!(
                "{} {}",
                "✗ Self-edit did not commit:".red(),
                body["error"].as_str().unwrap_or("unknown error")
            );
        }
        return Ok(());
    }

    let config = load_config(config_path)?;
    let assistant = build_assistant(&config).await?;

    if let Err(rejection) = assistant.guardrail.check(file) {
        println!("{} {}", "✗".red(), rejection);
        return Ok(());
    }

    match assistant
        .self_edit
        .request_self_edit(Path::new(file), feedback)
        .await
    {
        Ok(receipt) => println!(
            "{}",
            format!(
                "✓ Updated {} via {} at {}",
                receipt.target.display(),
                receipt.provider,
                receipt.committed_at.to_rfc3339()
            )
            .green()
        ),
        Err(e) => println!(
            "{} {} ({})",
            "✗ Self-edit did not commit:".red(),
            e,
            e.final_state()
        ),
    }

    Ok(())
}
