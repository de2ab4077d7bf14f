// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `vevo status`

use anyhow::Result;
use colored::Colorize;

use crate::daemon::{check_server_running, AssistantClient, ServerStatus};

pub async fn handle_command(host: &str, port: u16) -> Result<()> {
    match check_server_running(host, port).await? {
        ServerStatus::Running { uptime } => {
            println!("{}", "✓ Server is running".green());
            if let Some(uptime) = uptime {
                println!("  Uptime: {}s", uptime);
            }
        }
        ServerStatus::Stopped => {
            println!("{}", format!("✗ No server at {}:{}", host, port).red());
            return Ok(());
        }
        ServerStatus::Unhealthy { error } => {
            println!("{} {}", "⚠ Server is unhealthy:".yellow(), error);
            return Ok(());
        }
    }

    let client = AssistantClient::new(host, port)?;
    let system = client.system_status().await?;
    println!("  Status: {}", system["status"].as_str().unwrap_or("unknown"));
    println!("  Remembered turns: {}", system["memory"]);
    println!(
        "  Personality: {}",
        system["personality"].as_str().unwrap_or("unknown")
    );

    let learning = client.learning_status().await?;
    println!();
    println!("{}", "Learning:".bold());
    if learning["learningPlan"].is_null() {
        println!("  Plan: {}", "(none yet)".dimmed());
    } else {
        println!("  Plan: {}", learning["learningPlan"]);
    }
    if let Some(logs) = learning["recentLogs"].as_array() {
        for line in logs {
            println!("  {}", line.as_str().unwrap_or_default().dimmed());
        }
    }

    Ok(())
}
