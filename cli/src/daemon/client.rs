// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP client for communicating with a running server

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use vevo_core::domain::chat::ChatResponse;

use super::base_url;

#[derive(Debug, Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
}

impl AssistantClient {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let client = Client::builder()
            // Chat turns wait on upstream providers; no global timeout
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url(host, port),
        })
    }

    pub async fn chat(&self, message: &str) -> Result<ChatResponse> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&json!({ "message": message }))
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to send chat message")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat request rejected: {}", error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse chat response")
    }

    /// Returns the response body for both success and guardrail rejection.
    pub async fn self_edit(&self, file_path: &str, feedback: &str) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}/api/self-edit", self.base_url))
            .json(&json!({ "filePath": file_path, "feedback": feedback }))
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to request self-edit")?;

        match response.status() {
            status if status.is_success() || status == StatusCode::FORBIDDEN => response
                .json()
                .await
                .context("Failed to parse self-edit response"),
            status => anyhow::bail!("Self-edit request failed: HTTP {}", status),
        }
    }

    pub async fn review_learning(&self) -> Result<Value> {
        self.post_json("/api/review-learn").await
    }

    pub async fn system_status(&self) -> Result<Value> {
        self.get_json("/api/system-status").await
    }

    pub async fn learning_status(&self) -> Result<Value> {
        self.get_json("/api/learning-status").await
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("Failed to query {}", path))?;
        Self::parse(path, response).await
    }

    async fn post_json(&self, path: &str) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("Failed to call {}", path))?;
        Self::parse(path, response).await
    }

    async fn parse(path: &str, response: reqwest::Response) -> Result<Value> {
        if !response.status().is_success() {
            anyhow::bail!("{} returned HTTP {}", path, response.status());
        }
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", path))
    }
}
