//! Provider registration table

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::echo::EchoAdapter;
use super::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_KEY_ENV, GeminiAdapter};
use super::http_client::HttpClient;
use super::openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_KEY_ENV, OpenAiAdapter};
use super::retry::RetryPolicy;
use crate::domain::{EngineError, ProviderAdapter};

/// Endpoint settings for one HTTP backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    /// Environment variable holding the default API key
    pub api_key_env: String,
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>, api_key_env: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key_env: api_key_env.into(),
        }
    }
}

fn default_openai_endpoint() -> EndpointConfig {
    EndpointConfig::new(DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_KEY_ENV)
}

fn default_gemini_endpoint() -> EndpointConfig {
    EndpointConfig::new(DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_KEY_ENV)
}

/// Settings for the built-in adapters
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_openai_endpoint")]
    pub openai: EndpointConfig,
    #[serde(default = "default_gemini_endpoint")]
    pub gemini: EndpointConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: default_openai_endpoint(),
            gemini: default_gemini_endpoint(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Maps provider names to adapters. Built once at startup, read-only after.
#[derive(Debug, Default, Clone)]
pub struct ProviderRegistry {
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the openai, gemini and echo adapters
    pub fn with_defaults(config: &ProvidersConfig) -> Self {
        let openai = OpenAiAdapter::new(HttpClient::new())
            .with_base_url(&config.openai.base_url)
            .with_api_key_env(&config.openai.api_key_env)
            .with_retry(config.retry.clone());
        let gemini = GeminiAdapter::new(HttpClient::new())
            .with_base_url(&config.gemini.base_url)
            .with_api_key_env(&config.gemini.api_key_env)
            .with_retry(config.retry.clone());

        Self::new()
            .register(Arc::new(openai))
            .register(Arc::new(gemini))
            .register(Arc::new(EchoAdapter::new()))
    }

    /// Register an adapter under its own provider name, replacing any previous one
    pub fn register(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters
            .insert(adapter.provider_name().to_lowercase(), adapter);
        self
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ProviderAdapter>, EngineError> {
        self.adapters
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| EngineError::unknown_provider(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adapters.contains_key(&name.to_lowercase())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
