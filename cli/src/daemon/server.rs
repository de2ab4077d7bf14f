// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP server implementation

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use vevo_core::application::LearningReviewService;
use vevo_core::domain::audit::AuditEntry;
use vevo_core::domain::config::{AssistantConfigManifest, LearningConfig};
use vevo_core::infrastructure::audit_log::AppendLog;
use vevo_core::presentation::api;

use crate::embedded::{build_assistant, load_config};

pub async fn start_server(config_path: Option<PathBuf>, port_override: Option<u16>) -> Result<()> {
    let mut config = load_config(config_path)?;
    install_panic_hook(AppendLog::new(config.spec.storage.error_log()));
    if let Some(port) = port_override {
        config.spec.network.port = port;
    }

    info!(
        "Configuration loaded: name={} providers={}",
        config.metadata.name,
        config.spec.providers.len()
    );

    init_metrics(&config)?;

    let assistant = build_assistant(&config).await?;
    let learning = assistant.learning.clone();

    let review_task = tokio::spawn(run_learning_reviews(learning, config.spec.learning.clone()));

    let app = api::app(assistant, config.spec.network.body_limit_bytes);

    let addr = format!(
        "{}:{}",
        config.spec.network.bind_address, config.spec.network.port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    review_task.abort();
    info!("Server shutting down");

    Ok(())
}

/// Route panics through tracing and errors.log before the default hook runs.
fn install_panic_hook(error_log: AppendLog) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        record_panic(&error_log, &panic_info.to_string());
        default_hook(panic_info);
    }));
}

fn record_panic(error_log: &AppendLog, message: &str) {
    error!("Unhandled panic: {}", message);
    if let Err(e) = error_log.record_blocking(&AuditEntry::new("Unhandled panic", message)) {
        error!(path = %error_log.path().display(), "Failed to record panic: {}", e);
    }
}

fn init_metrics(config: &AssistantConfigManifest) -> Result<()> {
    let Some(metrics) = config
        .spec
        .observability
        .as_ref()
        .and_then(|o| o.metrics.as_ref())
        .filter(|m| m.enabled)
    else {
        return Ok(());
    };

    let endpoint = SocketAddr::from(([0, 0, 0, 0], metrics.port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(endpoint)
        .install()
        .context("Failed to install Prometheus exporter")?;

    info!("Prometheus metrics exposed on {}", endpoint);
    Ok(())
}

/// Periodic learning review. Failures are logged and never stop the loop.
async fn run_learning_reviews(
    learning: std::sync::Arc<LearningReviewService>,
    config: LearningConfig,
) {
    let period = Duration::from_secs(config.review_interval_secs.max(1));
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately
    if !config.run_on_startup {
        interval.tick().await;
    }

    loop {
        interval.tick().await;
        match learning.review().await {
            Ok(_) => info!("Scheduled learning review completed"),
            Err(e) => warn!("Scheduled learning review failed: {}", e),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_panic_is_written_to_error_log() {
        let dir = TempDir::new().unwrap();
        let log = AppendLog::new(dir.path().join("logs").join("errors.log"));

        record_panic(&log, "panicked at src/main.rs:3:5:\nboom");

        let written = std::fs::read_to_string(log.path()).unwrap();
        assert!(written.contains("] Unhandled panic\n"));
        assert!(written.contains("panicked at src/main.rs:3:5:\nboom"));
    }

    #[test]
    fn test_unwritable_error_log_does_not_panic() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, "not a directory").unwrap();

        record_panic(&AppendLog::new(blocker.join("errors.log")), "boom");

        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "not a directory");
    }
}
