// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Chat-Completion Provider Adapter
//
// Anti-Corruption Layer for OpenAI-style `chat/completions` APIs
// (OpenRouter, xAI and any other compatible endpoint).

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use crate::domain::config::CredentialPlacement;
use crate::domain::credential::Credential;
use crate::domain::provider::{ProviderCapability, ProviderClient, ProviderFailure, ProviderRequest};

use super::transport::{self, ProviderEndpoint};

pub struct ChatCompletionClient {
    name: String,
    client: reqwest::Client,
    endpoint: ProviderEndpoint,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl ChatCompletionClient {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        placement: CredentialPlacement,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            client: reqwest::Client::new(),
            endpoint: ProviderEndpoint::new(endpoint, placement),
            model: model.into(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl ProviderClient for ChatCompletionClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> ProviderCapability {
        ProviderCapability::ChatCompletion
    }

    async fn call(
        &self,
        credential: &Credential,
        request: &ProviderRequest,
    ) -> Result<String, ProviderFailure> {
        // Translate our domain request to the chat-completion message list
        let mut messages = Vec::with_capacity(request.user_turns.len() + 1);
        if let Some(system) = &request.system_prompt {
            messages.push(CompletionMessage {
                role: "system",
                content: system,
            });
        }
        messages.extend(request.user_turns.iter().map(|turn| CompletionMessage {
            role: "user",
            content: turn,
        }));

        let body = CompletionRequest {
            model: &self.model,
            messages,
        };

        let builder = self
            .endpoint
            .authorize(&self.client, Method::POST, credential)?
            .json(&body);
        let raw = transport::send(builder).await?;

        let value = transport::parse_json(&raw)?;
        transport::extract_text(&value, "/choices/0/message/content", &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::FailureKind;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_sends_system_and_user_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "openai/gpt-4",
                "messages": [
                    {"role": "system", "content": "You are Jarvis."},
                    {"role": "user", "content": "hi"},
                    {"role": "user", "content": "more"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Hello!"}}]}"#)
            .create_async()
            .await;

        let client = ChatCompletionClient::new(
            "OpenRouter",
            format!("{}/v1/chat/completions", server.url()),
            CredentialPlacement::Bearer,
            "openai/gpt-4",
        );
        let request = ProviderRequest::new(Some("You are Jarvis.".into()), "hi").with_turn("more");
        let reply = client.call(&Credential::new("sk-test"), &request).await.unwrap();

        assert_eq!(reply, "Hello!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_is_auth_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(401)
            .with_body(r#"{"error":{"message":"No auth credentials found"}}"#)
            .create_async()
            .await;

        let client = ChatCompletionClient::new(
            "OpenRouter",
            format!("{}/chat", server.url()),
            CredentialPlacement::Bearer,
            "m",
        );
        let err = client
            .call(&Credential::new("bad"), &ProviderRequest::new(None, "hi"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, FailureKind::Auth);
        assert_eq!(err.status, Some(401));
        assert!(err.raw_body.unwrap().contains("No auth credentials"));
    }

    #[tokio::test]
    async fn test_rate_limit_is_transport_failure() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/chat").with_status(429).create_async().await;

        let client = ChatCompletionClient::new(
            "xAI",
            format!("{}/chat", server.url()),
            CredentialPlacement::Bearer,
            "grok-1",
        );
        let err = client
            .call(&Credential::new("k"), &ProviderRequest::new(None, "hi"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, FailureKind::Transport);
        assert_eq!(err.status, Some(429));
    }

    #[tokio::test]
    async fn test_empty_choices_is_content_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = ChatCompletionClient::new(
            "OpenRouter",
            format!("{}/chat", server.url()),
            CredentialPlacement::Bearer,
            "m",
        );
        let err = client
            .call(&Credential::new("k"), &ProviderRequest::new(None, "hi"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, FailureKind::Content);
        assert!(!err.is_retryable());
    }
}
