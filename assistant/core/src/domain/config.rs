// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Assistant Configuration Types
//
// Defines the configuration schema for a Vevo assistant node, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Provider roster with credential slots (raw values come from the environment)
// - Dispatch, persona, storage and self-edit policy
// - Network and observability settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::guardrail::DEFAULT_PROTECTED_PATTERNS;
use super::persona::DEFAULT_LEAKAGE_RETRY_BOUND;
use super::provider::ProviderCapability;
use super::self_edit::DEFAULT_CANDIDATE_SUFFIX;

pub const API_VERSION: &str = "vevo.ai/v1";
pub const KIND: &str = "AssistantConfig";

/// Top-level Kubernetes-style configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfigManifest {
    /// API version (must be "vevo.ai/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "AssistantConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: AssistantConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable node name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfigSpec {
    /// Provider roster, in declaration order
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub persona: PersonaConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub self_edit: SelfEditConfig,

    #[serde(default)]
    pub learning: LearningConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

/// How the credential is attached to an outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "kebab-case")]
pub enum CredentialPlacement {
    /// `Authorization: Bearer <credential>`
    Bearer,
    /// `?<name>=<credential>`
    QueryParam { name: String },
    /// `<name>: <credential>`
    Header { name: String },
}

impl Default for CredentialPlacement {
    fn default() -> Self {
        Self::Bearer
    }
}

/// Body dialect for text-inference providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDialect {
    /// `{"inputs": "..."}` -> `[{"generated_text": "..."}]`
    Inputs,
    /// `{"prompt": {"text": "..."}}` -> `{"candidates": [{"output": "..."}]}`
    Prompt,
}

impl Default for TextDialect {
    fn default() -> Self {
        Self::Inputs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique provider name, reported as a reply source (e.g. "OpenRouter")
    pub name: String,

    #[serde(rename = "type")]
    pub capability: ProviderCapability,

    /// Full request URL
    pub endpoint: String,

    /// Model identifier, where the provider takes one in the body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Environment variable names holding credentials, in preference order
    #[serde(default)]
    pub credential_slots: Vec<String>,

    #[serde(default)]
    pub credential: CredentialPlacement,

    #[serde(default)]
    pub dialect: TextDialect,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Providers queried per chat turn. Empty means the first enabled
    /// chat-completion provider.
    #[serde(default)]
    pub active_providers: Vec<String>,

    /// Query active providers concurrently instead of in order
    #[serde(default)]
    pub concurrent: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            active_providers: vec![],
            concurrent: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_persona_name")]
    pub name: String,

    /// Maximum generation attempts when a reply leaks vendor identity
    #[serde(default = "default_leakage_retry_bound")]
    pub leakage_retry_bound: u32,

    /// Personality tag stored alongside memory
    #[serde(default = "default_personality")]
    pub personality: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            leakage_retry_bound: default_leakage_retry_bound(),
            personality: default_personality(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_memory_file")]
    pub memory_file: PathBuf,

    #[serde(default = "default_learning_queue_file")]
    pub learning_queue_file: PathBuf,

    #[serde(default = "default_learning_plan_file")]
    pub learning_plan_file: PathBuf,

    /// Directory holding errors.log, self_edits.log and learning.log
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            memory_file: default_memory_file(),
            learning_queue_file: default_learning_queue_file(),
            learning_plan_file: default_learning_plan_file(),
            log_dir: default_log_dir(),
        }
    }
}

impl StorageConfig {
    pub fn error_log(&self) -> PathBuf {
        self.log_dir.join("errors.log")
    }

    pub fn edit_log(&self) -> PathBuf {
        self.log_dir.join("self_edits.log")
    }

    pub fn learning_log(&self) -> PathBuf {
        self.log_dir.join("learning.log")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfEditConfig {
    /// Chat-completion provider used to request rewrites. Defaults to the
    /// first enabled chat-completion provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default = "default_candidate_suffix")]
    pub candidate_suffix: String,

    /// Syntax check command; `{path}` is replaced with the candidate path
    #[serde(default = "default_validator_command")]
    pub validator_command: Vec<String>,

    /// Substrings that make a path ineligible for self-edit
    #[serde(default = "default_protected_patterns")]
    pub protected_patterns: Vec<String>,
}

impl Default for SelfEditConfig {
    fn default() -> Self {
        Self {
            provider: None,
            candidate_suffix: default_candidate_suffix(),
            validator_command: default_validator_command(),
            protected_patterns: default_protected_patterns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    #[serde(default = "default_review_interval")]
    pub review_interval_secs: u64,

    #[serde(default = "default_true")]
    pub run_on_startup: bool,

    /// Chat-completion provider used for reviews; defaults like `self_edit.provider`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            review_interval_secs: default_review_interval(),
            run_on_startup: true,
            provider: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prometheus scrape port
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_persona_name() -> String {
    "Jarvis".to_string()
}

fn default_leakage_retry_bound() -> u32 {
    DEFAULT_LEAKAGE_RETRY_BOUND
}

fn default_personality() -> String {
    super::memory::DEFAULT_PERSONALITY.to_string()
}

fn default_memory_file() -> PathBuf {
    PathBuf::from("vevoMemory.json")
}

fn default_learning_queue_file() -> PathBuf {
    PathBuf::from("learningQueue.json")
}

fn default_learning_plan_file() -> PathBuf {
    PathBuf::from("learningPlan.json")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_candidate_suffix() -> String {
    DEFAULT_CANDIDATE_SUFFIX.to_string()
}

fn default_validator_command() -> Vec<String> {
    vec!["node".to_string(), "--check".to_string(), "{path}".to_string()]
}

fn default_protected_patterns() -> Vec<String> {
    DEFAULT_PROTECTED_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn default_review_interval() -> u64 {
    60 * 60
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    15 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_providers() -> Vec<ProviderConfig> {
    let slots = |prefix: &str, count: usize| -> Vec<String> {
        (1..=count).map(|i| format!("{}_{}", prefix, i)).collect()
    };

    vec![
        ProviderConfig {
            name: "OpenRouter".to_string(),
            capability: ProviderCapability::ChatCompletion,
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: Some("openai/gpt-4".to_string()),
            credential_slots: slots("OPENROUTER_API_KEY", 2),
            credential: CredentialPlacement::Bearer,
            dialect: TextDialect::default(),
            enabled: true,
        },
        ProviderConfig {
            name: "HuggingFace".to_string(),
            capability: ProviderCapability::TextInference,
            endpoint: "https://api-inference.huggingface.co/models/gpt2".to_string(),
            model: None,
            credential_slots: slots("HF_API_KEY", 3),
            credential: CredentialPlacement::Bearer,
            dialect: TextDialect::Inputs,
            enabled: true,
        },
        ProviderConfig {
            name: "GoogleAI".to_string(),
            capability: ProviderCapability::TextInference,
            endpoint: "https://generativelanguage.googleapis.com/v1beta2/models/text-bison-001:generateText".to_string(),
            model: None,
            credential_slots: slots("GOOGLE_API_KEY", 3),
            credential: CredentialPlacement::QueryParam {
                name: "key".to_string(),
            },
            dialect: TextDialect::Prompt,
            enabled: true,
        },
        ProviderConfig {
            name: "xAI".to_string(),
            capability: ProviderCapability::ChatCompletion,
            endpoint: "https://api.x.ai/v1/chat/completions".to_string(),
            model: Some("grok-1".to_string()),
            credential_slots: slots("XAI_API_KEY", 3),
            credential: CredentialPlacement::Bearer,
            dialect: TextDialect::default(),
            enabled: true,
        },
        ProviderConfig {
            name: "Polygon".to_string(),
            capability: ProviderCapability::DataLookup,
            endpoint: "https://api.polygon.io/v2/aggs/ticker/AAPL/prev?adjusted=true".to_string(),
            model: None,
            credential_slots: slots("POLYGON_API_KEY", 2),
            credential: CredentialPlacement::QueryParam {
                name: "apiKey".to_string(),
            },
            dialect: TextDialect::default(),
            enabled: true,
        },
        ProviderConfig {
            name: "Alpaca".to_string(),
            capability: ProviderCapability::DataLookup,
            endpoint: "https://paper-api.alpaca.markets/v2/account".to_string(),
            model: None,
            credential_slots: slots("ALPACA_API_KEY", 1),
            credential: CredentialPlacement::Header {
                name: "APCA-API-KEY-ID".to_string(),
            },
            dialect: TextDialect::default(),
            enabled: true,
        },
    ]
}

impl Default for AssistantConfigSpec {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            dispatch: DispatchConfig::default(),
            persona: PersonaConfig::default(),
            storage: StorageConfig::default(),
            self_edit: SelfEditConfig::default(),
            learning: LearningConfig::default(),
            network: NetworkConfig::default(),
            observability: None,
        }
    }
}

impl Default for AssistantConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "vevo".to_string(),
                version: Some("1.0.0".to_string()),
            },
            spec: AssistantConfigSpec::default(),
        }
    }
}

impl AssistantConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. VEVO_CONFIG_PATH environment variable
    /// 2. ./vevo-config.yaml (working directory)
    /// 3. ~/.vevo/config.yaml (user home)
    /// 4. /etc/vevo/config.yaml (Unix system config)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("VEVO_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./vevo-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".vevo").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/vevo/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails if missing or invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PORT").or_else(|_| std::env::var("VEVO_PORT")) {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: port={}", port);
                    self.spec.network.port = port;
                }
                Err(_) => {
                    tracing::warn!("Invalid port override '{}'. Ignoring.", val);
                }
            }
        }

        if let Ok(val) = std::env::var("VEVO_CONCURRENT_DISPATCH") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => self.spec.dispatch.concurrent = true,
                "false" | "0" | "no" | "off" => self.spec.dispatch.concurrent = false,
                _ => {
                    tracing::warn!(
                        "Invalid value for VEVO_CONCURRENT_DISPATCH: '{}'. Expected true/false. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        for provider in &self.spec.providers {
            if provider.name.is_empty() {
                anyhow::bail!("Provider name cannot be empty");
            }

            if provider.endpoint.is_empty() {
                anyhow::bail!("Provider endpoint cannot be empty for: {}", provider.name);
            }

            if provider.credential_slots.is_empty() {
                anyhow::bail!("Provider must list at least one credential slot: {}", provider.name);
            }

            let duplicates = self
                .spec
                .providers
                .iter()
                .filter(|p| p.name == provider.name)
                .count();
            if duplicates > 1 {
                anyhow::bail!("Duplicate provider name: {}", provider.name);
            }
        }

        for name in &self.spec.dispatch.active_providers {
            if !self.spec.providers.iter().any(|p| &p.name == name) {
                anyhow::bail!("Active provider '{}' not found in providers", name);
            }
        }

        for name in [&self.spec.self_edit.provider, &self.spec.learning.provider]
            .into_iter()
            .flatten()
        {
            match self.spec.providers.iter().find(|p| &p.name == name) {
                Some(p) if p.capability == ProviderCapability::ChatCompletion => {}
                Some(_) => anyhow::bail!("Provider '{}' must be a chat-completion provider", name),
                None => anyhow::bail!("Provider '{}' not found in providers", name),
            }
        }

        if self.spec.persona.leakage_retry_bound == 0 {
            anyhow::bail!("persona.leakage_retry_bound must be at least 1");
        }

        if self.spec.self_edit.validator_command.is_empty() {
            anyhow::bail!("self_edit.validator_command cannot be empty");
        }

        if self.spec.self_edit.candidate_suffix.is_empty() {
            anyhow::bail!("self_edit.candidate_suffix cannot be empty");
        }

        Ok(())
    }
}

/// Shorthand used by callers that only care about the spec.
pub type AssistantConfig = AssistantConfigManifest;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let manifest = AssistantConfigManifest::default();
        assert_eq!(manifest.api_version, "vevo.ai/v1");
        assert_eq!(manifest.kind, "AssistantConfig");
        assert_eq!(manifest.spec.persona.leakage_retry_bound, 3);
        assert_eq!(manifest.spec.providers[0].name, "OpenRouter");
        assert!(manifest.spec.dispatch.active_providers.is_empty());
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_yaml_sparse_spec_takes_defaults() {
        let yaml = r#"
apiVersion: vevo.ai/v1
kind: AssistantConfig
metadata:
  name: test-node
spec:
  providers:
    - name: Local
      type: chat-completion
      endpoint: http://localhost:1234/v1/chat/completions
      model: llama
      credential_slots: [LOCAL_KEY]
  persona:
    name: Vevo
"#;
        let manifest = AssistantConfigManifest::from_yaml_str(yaml).unwrap();
        assert_eq!(manifest.spec.providers.len(), 1);
        assert_eq!(manifest.spec.providers[0].credential, CredentialPlacement::Bearer);
        assert_eq!(manifest.spec.persona.name, "Vevo");
        assert_eq!(manifest.spec.persona.leakage_retry_bound, 3);
        assert_eq!(manifest.spec.storage.memory_file, PathBuf::from("vevoMemory.json"));
        assert_eq!(manifest.spec.storage.edit_log(), PathBuf::from("logs/self_edits.log"));
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_credential_placement_yaml() {
        let yaml = r#"
name: Polygon
type: data-lookup
endpoint: https://example.test/prev
credential_slots: [POLYGON_API_KEY_1]
credential:
  style: query-param
  name: apiKey
"#;
        let provider: ProviderConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(provider.capability, ProviderCapability::DataLookup);
        assert_eq!(
            provider.credential,
            CredentialPlacement::QueryParam {
                name: "apiKey".to_string()
            }
        );
    }

    #[test]
    fn test_validation() {
        let mut manifest = AssistantConfigManifest::default();

        manifest.api_version = "wrong/v1".to_string();
        assert!(manifest.validate().is_err());
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "WrongKind".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = KIND.to_string();

        manifest.spec.persona.leakage_retry_bound = 0;
        assert!(manifest.validate().is_err());
        manifest.spec.persona.leakage_retry_bound = 2;
        assert!(manifest.validate().is_ok());

        manifest.spec.dispatch.active_providers = vec!["Nope".to_string()];
        assert!(manifest.validate().is_err());
        manifest.spec.dispatch.active_providers = vec!["xAI".to_string()];
        assert!(manifest.validate().is_ok());

        manifest.spec.self_edit.provider = Some("Polygon".to_string());
        assert!(manifest.validate().is_err());
        manifest.spec.self_edit.provider = None;

        manifest.spec.providers[0].credential_slots.clear();
        assert!(manifest.validate().is_err());
    }
}
