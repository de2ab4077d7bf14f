// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Learning review commands
//!
//! Commands: review, status

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use super::server_client;
use crate::embedded::{build_assistant, load_config};

#[derive(Subcommand)]
pub enum LearnCommand {
    /// Run a learning review now
    Review,

    /// Show the current learning plan and recent review log
    Status,
}

pub async fn handle_command(
    command: LearnCommand,
    config_path: Option<PathBuf>,
    host: &str,
    port: u16,
) -> Result<()> {
    let client = server_client(host, port).await?;

    let body = match (command, client) {
        (LearnCommand::Review, Some(client)) => client.review_learning().await?,
        (LearnCommand::Status, Some(client)) => client.learning_status().await?,
        (command, None) => {
            let config = load_config(config_path)?;
            let assistant = build_assistant(&config).await?;
            match command {
                LearnCommand::Review => match assistant.learning.review().await {
                    Ok(plan) => serde_json::json!({ "success": true, "result": plan }),
                    Err(e) => {
                        println!("{} {}", "✗ Learning review failed:".red(), e);
                        return Ok(());
                    }
                },
                LearnCommand::Status => serde_json::to_value(assistant.learning.status().await)?,
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
