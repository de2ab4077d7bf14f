// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Server mode implementation
//!
//! Handles:
//! - HTTP server lifecycle
//! - HTTP health checks
//! - Graceful shutdown

use anyhow::Result;
use std::time::Duration;
use tracing::debug;

pub mod client;
pub mod server;

pub use client::AssistantClient;
pub use server::start_server;

/// Port used by client commands when none is given.
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub enum ServerStatus {
    Running { uptime: Option<u64> },
    Stopped,
    Unhealthy { error: String },
}

/// Base URL for `host:port`, accepting hosts with or without a scheme.
pub fn base_url(host: &str, port: u16) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}:{}", host.trim_end_matches('/'), port)
    } else {
        format!("http://{}:{}", host, port)
    }
}

/// Check whether a server answers `/health` at `host:port`.
pub async fn check_server_running(host: &str, port: u16) -> Result<ServerStatus> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(500)) // Fast timeout for local checks
        .build()?;

    let health_url = format!("{}/health", base_url(host, port));

    match client.get(&health_url).send().await {
        Ok(response) if response.status().is_success() => {
            let uptime = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body["uptime_seconds"].as_u64());
            Ok(ServerStatus::Running { uptime })
        }
        Ok(response) => Ok(ServerStatus::Unhealthy {
            error: format!("HTTP {}", response.status()),
        }),
        Err(e) => {
            debug!("Health check failed: {}", e.without_url());
            Ok(ServerStatus::Stopped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("127.0.0.1", 8080), "http://127.0.0.1:8080");
        assert_eq!(base_url("https://vevo.local/", 443), "https://vevo.local:443");
    }

    #[tokio::test]
    async fn test_check_server_running() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .with_status(200)
            .with_body(r#"{"status":"healthy","uptime_seconds":42}"#)
            .create_async()
            .await;

        let addr = server.host_with_port();
        let (host, port) = addr.rsplit_once(':').unwrap();
        let status = check_server_running(host, port.parse().unwrap()).await.unwrap();

        assert_eq!(status, ServerStatus::Running { uptime: Some(42) });
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_check_server_unhealthy() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(503)
            .create_async()
            .await;

        let addr = server.host_with_port();
        let (host, port) = addr.rsplit_once(':').unwrap();
        let status = check_server_running(host, port.parse().unwrap()).await.unwrap();

        assert!(matches!(status, ServerStatus::Unhealthy { .. }));
    }
}
