// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `vevo chat`

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use vevo_core::domain::chat::ChatResponse;

use super::server_client;
use crate::embedded::{build_assistant, load_config};

pub async fn handle_command(
    message: &str,
    json: bool,
    config_path: Option<PathBuf>,
    host: &str,
    port: u16,
) -> Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("No message provided");
    }

    let response = match server_client(host, port).await? {
        Some(client) => client.chat(message).await?,
        None => {
            let config = load_config(config_path)?;
            let assistant = build_assistant(&config).await?;
            assistant.chat.handle_chat(message).await
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }
    Ok(())
}

fn print_response(response: &ChatResponse) {
    println!("{}", response.reply);
    println!();

    let confidence = format!("confidence {:.2}", response.confidence);
    if response.is_fallback {
        println!("{} {}", confidence.yellow(), "(queued for learning)".dimmed());
    } else {
        println!("{} {}", confidence.green(), response.sources.join(", ").dimmed());
    }

    for error in &response.errors {
        println!(
            "  {} {} {}: {}",
            "!".red(),
            error.source,
            error.key,
            error.message
        );
    }
}
