// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! External syntax check.
//!
//! Runs a configured command (default `node --check {path}`) with the
//! candidate path substituted for `{path}`. Exit status 0 passes; anything
//! else, including a command that cannot be started, fails with the captured
//! stderr (or stdout when stderr is empty) as the diagnostic.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::domain::self_edit::{SyntaxValidator, ValidationVerdict};

const PATH_PLACEHOLDER: &str = "{path}";

#[derive(Debug, Clone)]
pub struct CommandSyntaxValidator {
    command: Vec<String>,
}

impl CommandSyntaxValidator {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    fn args_for(&self, path: &Path) -> Vec<String> {
        let path = path.display().to_string();
        let mut args: Vec<String> = self
            .command
            .iter()
            .skip(1)
            .map(|arg| arg.replace(PATH_PLACEHOLDER, &path))
            .collect();
        if !self.command.iter().any(|arg| arg.contains(PATH_PLACEHOLDER)) {
            args.push(path);
        }
        args
    }
}

#[async_trait]
impl SyntaxValidator for CommandSyntaxValidator {
    async fn check(&self, path: &Path) -> ValidationVerdict {
        let Some(program) = self.command.first() else {
            return ValidationVerdict::Fail("No validator command configured".to_string());
        };
        let args = self.args_for(path);
        debug!(program = %program, ?args, "Running syntax check");

        let output = match Command::new(program).args(&args).output().await {
            Ok(output) => output,
            Err(e) => {
                return ValidationVerdict::Fail(format!("Failed to run '{}': {}", program, e));
            }
        };

        if output.status.success() {
            return ValidationVerdict::Pass;
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let diagnostic = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        ValidationVerdict::Fail(if diagnostic.is_empty() {
            format!("Syntax check exited with {}", output.status)
        } else {
            diagnostic
        })
    }
}
