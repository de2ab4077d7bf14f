// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Vevo CLI
//!
//! The `vevo` binary runs the conversational backend and talks to it.
//!
//! ## Commands
//!
//! - `vevo serve` - Run the HTTP server in the foreground
//! - `vevo status` - Query a running server
//! - `vevo chat <message>` - One chat turn (delegates to a running server, else embedded)
//! - `vevo self-edit <file> --feedback <text>` - Request a guarded self-edit
//! - `vevo learn review|status` - Trigger or inspect the learning review
//! - `vevo config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use vevo_cli::commands::{self, ConfigCommand, LearnCommand};
use vevo_cli::daemon;

/// Vevo - persona-consistent conversational backend
#[derive(Parser)]
#[command(name = "vevo")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "VEVO_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP API port (overrides configuration)
    #[arg(long, global = true, env = "VEVO_PORT")]
    port: Option<u16>,

    /// HTTP API host used by client commands
    #[arg(long, global = true, env = "VEVO_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "VEVO_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "VEVO_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    #[command(name = "serve")]
    Serve,

    /// Show the status of a running server
    #[command(name = "status")]
    Status,

    /// Send one chat message
    #[command(name = "chat")]
    Chat {
        /// Message text
        message: String,

        /// Print the full JSON response
        #[arg(long)]
        json: bool,
    },

    /// Ask the assistant to rewrite one of its own files
    #[command(name = "self-edit")]
    SelfEdit {
        /// File to rewrite
        #[arg(value_name = "FILE")]
        file: String,

        /// What to change
        #[arg(short, long)]
        feedback: String,
    },

    /// Learning review
    #[command(name = "learn")]
    Learn {
        #[command(subcommand)]
        command: LearnCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials usually live in .env next to the binary
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_json)?;

    match cli.command {
        Some(Commands::Serve) => daemon::start_server(cli.config, cli.port).await,
        Some(Commands::Status) => commands::status::handle_command(&cli.host, port(cli.port)).await,
        Some(Commands::Chat { message, json }) => {
            commands::chat::handle_command(&message, json, cli.config, &cli.host, port(cli.port))
                .await
        }
        Some(Commands::SelfEdit { file, feedback }) => {
            commands::self_edit::handle_command(
                &file,
                &feedback,
                cli.config,
                &cli.host,
                port(cli.port),
            )
            .await
        }
        Some(Commands::Learn { command }) => {
            commands::learn::handle_command(command, cli.config, &cli.host, port(cli.port)).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

fn port(override_port: Option<u16>) -> u16 {
    override_port.unwrap_or(daemon::DEFAULT_PORT)
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .init();
    }

    Ok(())
}
