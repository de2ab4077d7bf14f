// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Data-Lookup Provider Adapter
//
// Plain authenticated GET against a structured-data API. The request payload
// is ignored; the reply is the JSON body re-serialized in compact form.

use async_trait::async_trait;
use reqwest::Method;

use crate::domain::config::CredentialPlacement;
use crate::domain::credential::Credential;
use crate::domain::provider::{ProviderCapability, ProviderClient, ProviderFailure, ProviderRequest};

use super::transport::{self, ProviderEndpoint};

pub struct DataLookupClient {
    name: String,
    client: reqwest::Client,
    endpoint: ProviderEndpoint,
}

impl DataLookupClient {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        placement: CredentialPlacement,
    ) -> Self {
        Self {
            name: name.into(),
            client: reqwest::Client::new(),
            endpoint: ProviderEndpoint::new(endpoint, placement),
        }
    }
}

#[async_trait]
impl ProviderClient for DataLookupClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> ProviderCapability {
        ProviderCapability::DataLookup
    }

    async fn call(
        &self,
        credential: &Credential,
        _request: &ProviderRequest,
    ) -> Result<String, ProviderFailure> {
        let builder = self.endpoint.authorize(&self.client, Method::GET, credential)?;
        let raw = transport::send(builder).await?;

        let value = transport::parse_json(&raw)?;
        if value.is_null() {
            return Err(ProviderFailure::no_content("Empty lookup result", Some(raw)));
        }
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::FailureKind;

    #[tokio::test]
    async fn test_header_credential_and_compact_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/account")
            .match_header("APCA-API-KEY-ID", "alpaca-key")
            .with_status(200)
            .with_body("{\n  \"status\": \"ACTIVE\"\n}")
            .create_async()
            .await;

        let client = DataLookupClient::new(
            "Alpaca",
            format!("{}/v2/account", server.url()),
            CredentialPlacement::Header {
                name: "APCA-API-KEY-ID".to_string(),
            },
        );
        let reply = client
            .call(&Credential::new("alpaca-key"), &ProviderRequest::new(None, "ignored"))
            .await
            .unwrap();

        assert_eq!(reply, r#"{"status":"ACTIVE"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forbidden_is_auth_failure() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/prev").match_query(mockito::Matcher::Any).with_status(403).create_async().await;

        let client = DataLookupClient::new(
            "Polygon",
            format!("{}/prev", server.url()),
            CredentialPlacement::QueryParam {
                name: "apiKey".to_string(),
            },
        );
        let err = client
            .call(&Credential::new("k"), &ProviderRequest::new(None, ""))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Auth);
    }
}
