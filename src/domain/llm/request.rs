use std::time::Duration;

use super::ProviderConfig;
use crate::domain::AgentDefinition;

/// A fully rendered prompt plus the generation parameters for one call
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub prompt: String,
    pub model: &'a str,
    pub temperature: f64,
    pub max_tokens: u32,
    pub provider_config: &'a ProviderConfig,
    /// Upper bound for the whole call, retries included
    pub timeout: Duration,
}

impl<'a> GenerationRequest<'a> {
    /// Build a request from an agent's generation settings
    pub fn for_agent(agent: &'a AgentDefinition, prompt: String, timeout: Duration) -> Self {
        Self {
            prompt,
            model: agent.model_name(),
            temperature: agent.temperature(),
            max_tokens: agent.max_tokens(),
            provider_config: agent.provider_config(),
            timeout,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}
