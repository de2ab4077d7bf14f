// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use vevo_core::domain::config::{AssistantConfigManifest, CredentialPlacement};
use vevo_core::domain::credential::CredentialPool;
use vevo_core::infrastructure::credentials::EnvCredentialSource;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate a configuration file populated with defaults
    Generate {
        /// Output path (default: ./vevo-config.yaml)
        #[arg(short, long, default_value = "./vevo-config.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate { output, force } => generate(output, force),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = AssistantConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. VEVO_CONFIG_PATH: {}",
            std::env::var("VEVO_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./vevo-config.yaml");
        println!("  4. ~/.vevo/config.yaml");
        println!("  5. /etc/vevo/config.yaml");
        println!();
    }

    let spec = &config.spec;
    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Persona:".bold());
    println!("  Name: {}", spec.persona.name);
    println!("  Personality: {}", spec.persona.personality);
    println!("  Leakage retry bound: {}", spec.persona.leakage_retry_bound);
    println!();

    // Credential values are never printed, only how many slots resolve
    println!("{}", "Providers:".bold());
    for provider in &spec.providers {
        let pool = CredentialPool::resolve(
            &provider.name,
            &provider.credential_slots,
            &EnvCredentialSource,
        );
        let placement = match &provider.credential {
            CredentialPlacement::Bearer => "bearer".to_string(),
            CredentialPlacement::QueryParam { name } => format!("query ?{}=", name),
            CredentialPlacement::Header { name } => format!("header {}", name),
        };
        let state = if !provider.enabled {
            "disabled".dimmed()
        } else if pool.is_empty() {
            "no credential".yellow()
        } else {
            format!("{}/{} credentials", pool.len(), provider.credential_slots.len()).green()
        };
        println!(
            "  {} ({:?}) {}",
            provider.name.bold(),
            provider.capability,
            state
        );
        println!("    Endpoint: {}", provider.endpoint);
        println!("    Credential: {}", placement);
    }
    println!();

    println!("{}", "Dispatch:".bold());
    if spec.dispatch.active_providers.is_empty() {
        println!("  Active providers: {}", "(first chat-completion provider)".dimmed());
    } else {
        println!("  Active providers: {}", spec.dispatch.active_providers.join(", "));
    }
    println!("  Concurrent: {}", spec.dispatch.concurrent);
    println!();

    println!("{}", "Storage:".bold());
    println!("  Memory: {}", spec.storage.memory_file.display());
    println!("  Learning queue: {}", spec.storage.learning_queue_file.display());
    println!("  Learning plan: {}", spec.storage.learning_plan_file.display());
    println!("  Logs: {}", spec.storage.log_dir.display());
    println!();

    println!("{}", "Network:".bold());
    println!(
        "  Listen: {}:{}",
        spec.network.bind_address, spec.network.port
    );

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = AssistantConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn generate(output: PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    AssistantConfigManifest::default()
        .to_yaml_file(&output)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_writes_valid_config() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("vevo-config.yaml");

        generate(output.clone(), false).unwrap();
        let config = AssistantConfigManifest::from_yaml_file(&output).unwrap();
        config.validate().unwrap();

        assert!(generate(output.clone(), false).is_err());
        generate(output, true).unwrap();
    }
}
