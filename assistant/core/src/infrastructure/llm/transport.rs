// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// HTTP transport shared by every provider adapter.
//
// This is the only place a `reqwest` error or a non-success status is seen.
// Both leave as a `ProviderFailure`: network errors as `Transport` without a
// status, 401/403 as `Auth`, every other non-2xx as `Transport` carrying the
// status and the response body.

use reqwest::{Client, Method, RequestBuilder, Url};

use crate::domain::config::CredentialPlacement;
use crate::domain::credential::Credential;
use crate::domain::provider::ProviderFailure;

/// A provider URL plus the way its credential is attached.
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    url: String,
    placement: CredentialPlacement,
}

impl ProviderEndpoint {
    pub fn new(url: impl Into<String>, placement: CredentialPlacement) -> Self {
        Self {
            url: url.into(),
            placement,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Start a request with the credential attached.
    pub fn authorize(
        &self,
        client: &Client,
        method: Method,
        credential: &Credential,
    ) -> Result<RequestBuilder, ProviderFailure> {
        let mut url = Url::parse(&self.url).map_err(|e| {
            ProviderFailure::network(format!("Invalid endpoint '{}': {}", self.url, e))
        })?;

        if let CredentialPlacement::QueryParam { name } = &self.placement {
            url.query_pairs_mut().append_pair(name, credential.expose());
        }

        let builder = client.request(method, url);
        Ok(match &self.placement {
            CredentialPlacement::Bearer => builder.bearer_auth(credential.expose()),
            CredentialPlacement::Header { name } => builder.header(name.as_str(), credential.expose()),
            CredentialPlacement::QueryParam { .. } => builder,
        })
    }
}

/// Send the request and return the body of a 2xx response.
pub async fn send(builder: RequestBuilder) -> Result<String, ProviderFailure> {
    // `without_url` keeps query-string credentials out of the message.
    let response = builder
        .send()
        .await
        .map_err(|e| ProviderFailure::network(e.without_url().to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderFailure::network(e.without_url().to_string()))?;

    if !status.is_success() {
        return Err(ProviderFailure::from_status(status.as_u16(), body));
    }

    Ok(body)
}

/// Parse a 2xx body as JSON; an unparseable body is a content failure.
pub fn parse_json(body: &str) -> Result<serde_json::Value, ProviderFailure> {
    serde_json::from_str(body).map_err(|e| {
        ProviderFailure::no_content(format!("Failed to parse response: {}", e), Some(body.to_string()))
    })
}

/// Text at `pointer`, or a content failure. Non-string values are serialized.
pub fn extract_text(
    value: &serde_json::Value,
    pointer: &str,
    body: &str,
) -> Result<String, ProviderFailure> {
    let text = match value.pointer(pointer) {
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    if text.trim().is_empty() {
        return Err(ProviderFailure::no_content(
            "No content in response",
            Some(body.to_string()),
        ));
    }

    Ok(text)
}
