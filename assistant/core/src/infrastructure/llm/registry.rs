// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Provider Registry - Client Construction and Credential Resolution
//
// Builds one `ProviderClient` per enabled provider in the configuration and
// resolves its credential slots into a `CredentialPool`. Dispatch order is
// declaration order.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::dispatcher::ActiveProvider;
use crate::domain::config::{AssistantConfigSpec, DispatchConfig, ProviderConfig};
use crate::domain::credential::{CredentialPool, CredentialSource};
use crate::domain::provider::{ProviderCapability, ProviderClient};

use super::chat_completion::ChatCompletionClient;
use super::data_lookup::DataLookupClient;
use super::text_inference::TextInferenceClient;

/// Registry of configured providers and their credentials
pub struct ProviderRegistry {
    providers: HashMap<String, ActiveProvider>,
    order: Vec<String>,
}

impl ProviderRegistry {
    /// Create provider registry from assistant configuration
    pub fn from_config(spec: &AssistantConfigSpec, credentials: &dyn CredentialSource) -> Self {
        let mut providers = HashMap::new();
        let mut order = Vec::new();

        info!("Initializing provider registry");

        for provider_config in &spec.providers {
            if !provider_config.enabled {
                info!("Provider '{}' disabled, skipping", provider_config.name);
                continue;
            }

            let pool = CredentialPool::resolve(
                provider_config.name.clone(),
                &provider_config.credential_slots,
                credentials,
            );
            if pool.is_empty() {
                warn!("No credential configured for provider '{}'", provider_config.name);
            } else {
                info!(
                    "Initialized provider: {} ({}, {} credential(s))",
                    provider_config.name,
                    provider_config.capability,
                    pool.len()
                );
            }

            let client = Self::create_client(provider_config);
            order.push(provider_config.name.clone());
            providers.insert(provider_config.name.clone(), ActiveProvider::new(client, pool));
        }

        if providers.is_empty() {
            warn!("No providers configured - every chat turn will fall back");
        }

        Self { providers, order }
    }

    /// Create a client instance from configuration
    fn create_client(config: &ProviderConfig) -> Arc<dyn ProviderClient> {
        match config.capability {
            ProviderCapability::ChatCompletion => Arc::new(ChatCompletionClient::new(
                config.name.clone(),
                config.endpoint.clone(),
                config.credential.clone(),
                config.model.clone().unwrap_or_default(),
            )),
            ProviderCapability::TextInference => Arc::new(TextInferenceClient::new(
                config.name.clone(),
                config.endpoint.clone(),
                config.credential.clone(),
                config.dialect,
            )),
            ProviderCapability::DataLookup => Arc::new(DataLookupClient::new(
                config.name.clone(),
                config.endpoint.clone(),
                config.credential.clone(),
            )),
        }
    }

    /// Create a registry from already constructed providers (test wiring)
    pub fn from_providers(providers: Vec<ActiveProvider>) -> Self {
        let order = providers.iter().map(|p| p.name().to_string()).collect();
        let providers = providers
            .into_iter()
            .map(|p| (p.name().to_string(), p))
            .collect();
        Self { providers, order }
    }

    pub fn get(&self, name: &str) -> Option<&ActiveProvider> {
        self.providers.get(name)
    }

    /// List all provider names in declaration order
    pub fn list_providers(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Providers queried for every chat turn. With no explicit list, only the
    /// first chat-completion provider is active.
    pub fn active_providers(&self, dispatch: &DispatchConfig) -> Vec<ActiveProvider> {
        if dispatch.active_providers.is_empty() {
            return self.first_chat_provider().into_iter().collect();
        }

        dispatch
            .active_providers
            .iter()
            .filter_map(|name| {
                let provider = self.providers.get(name);
                if provider.is_none() {
                    warn!("Active provider '{}' is not enabled, skipping", name);
                }
                provider.cloned()
            })
            .collect()
    }

    /// Chat-completion provider for out-of-band work (self-edit, learning
    /// review): the named one, or the first chat-completion provider.
    pub fn review_provider(&self, name: Option<&str>) -> Option<ActiveProvider> {
        match name {
            Some(name) => self
                .providers
                .get(name)
                .filter(|p| p.client.capability() == ProviderCapability::ChatCompletion)
                .cloned(),
            None => self.first_chat_provider(),
        }
    }

    fn first_chat_provider(&self) -> Option<ActiveProvider> {
        self.order
            .iter()
            .filter_map(|name| self.providers.get(name))
            .find(|p| p.client.capability() == ProviderCapability::ChatCompletion)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::credentials::StaticCredentialSource;

    fn source() -> StaticCredentialSource {
        StaticCredentialSource::from_pairs([
            ("OPENROUTER_API_KEY_1", "\u{feff}sk-or-1\n"),
            ("OPENROUTER_API_KEY_2", ""),
            ("XAI_API_KEY_2", "xai-2"),
        ])
    }

    #[test]
    fn test_default_roster_resolves_credentials() {
        let spec = AssistantConfigSpec::default();
        let registry = ProviderRegistry::from_config(&spec, &source());

        assert_eq!(
            registry.list_providers(),
            vec!["OpenRouter", "HuggingFace", "GoogleAI", "xAI", "Polygon", "Alpaca"]
        );
        let openrouter = registry.get("OpenRouter").unwrap();
        assert_eq!(openrouter.credentials.len(), 1);
        assert_eq!(openrouter.credentials.first().unwrap().expose(), "sk-or-1");
        assert!(!registry.get("HuggingFace").unwrap().has_credentials());
        assert_eq!(registry.get("xAI").unwrap().credentials.len(), 1);
    }

    #[test]
    fn test_default_active_provider_is_first_chat_completion() {
        let spec = AssistantConfigSpec::default();
        let registry = ProviderRegistry::from_config(&spec, &source());

        let active = registry.active_providers(&DispatchConfig::default());
        let names: Vec<&str> = active.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["OpenRouter"]);

        let dispatch = DispatchConfig {
            active_providers: vec!["xAI".into(), "Polygon".into(), "Missing".into()],
            concurrent: true,
        };
        let names: Vec<String> = registry
            .active_providers(&dispatch)
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["xAI", "Polygon"]);
    }

    #[test]
    fn test_disabled_providers_are_skipped() {
        let mut spec = AssistantConfigSpec::default();
        spec.providers[0].enabled = false;
        let registry = ProviderRegistry::from_config(&spec, &source());

        assert!(registry.get("OpenRouter").is_none());
        assert_eq!(registry.review_provider(None).unwrap().name(), "xAI");
        assert!(registry.review_provider(Some("Polygon")).is_none());
    }
}
