// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Text-Inference Provider Adapter
//
// Single-prompt generation APIs. Two body dialects are supported:
// - `inputs`: `{"inputs": "..."}` answered by `[{"generated_text": "..."}]`
// - `prompt`: `{"prompt": {"text": "..."}}` answered by `{"candidates": [{"output": "..."}]}`

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use crate::domain::config::{CredentialPlacement, TextDialect};
use crate::domain::credential::Credential;
use crate::domain::provider::{ProviderCapability, ProviderClient, ProviderFailure, ProviderRequest};

use super::transport::{self, ProviderEndpoint};

pub struct TextInferenceClient {
    name: String,
    client: reqwest::Client,
    endpoint: ProviderEndpoint,
    dialect: TextDialect,
}

impl TextInferenceClient {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        placement: CredentialPlacement,
        dialect: TextDialect,
    ) -> Self {
        Self {
            name: name.into(),
            client: reqwest::Client::new(),
            endpoint: ProviderEndpoint::new(endpoint, placement),
            dialect,
        }
    }

    fn body(&self, prompt: String) -> serde_json::Value {
        match self.dialect {
            TextDialect::Inputs => json!({ "inputs": prompt }),
            TextDialect::Prompt => json!({ "prompt": { "text": prompt } }),
        }
    }

    fn extract(&self, value: &serde_json::Value, raw: &str) -> Result<String, ProviderFailure> {
        match self.dialect {
            // Some deployments answer with a bare object instead of a list
            TextDialect::Inputs if value.is_object() => {
                transport::extract_text(value, "/generated_text", raw)
            }
            TextDialect::Inputs => transport::extract_text(value, "/0/generated_text", raw),
            TextDialect::Prompt => transport::extract_text(value, "/candidates/0/output", raw),
        }
    }
}

#[async_trait]
impl ProviderClient for TextInferenceClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> ProviderCapability {
        ProviderCapability::TextInference
    }

    async fn call(
        &self,
        credential: &Credential,
        request: &ProviderRequest,
    ) -> Result<String, ProviderFailure> {
        let builder = self
            .endpoint
            .authorize(&self.client, Method::POST, credential)?
            .json(&self.body(request.flattened()));
        let raw = transport::send(builder).await?;

        let value = transport::parse_json(&raw)?;
        self.extract(&value, &raw)
    }
}
