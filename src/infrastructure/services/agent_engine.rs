//! Agent engine - resolves agents and providers, then processes chunks

use std::sync::Arc;

use tracing::info;

use crate::domain::{AgentDefinition, AggregatedResult, EngineError};
use crate::infrastructure::agent::AgentRegistry;
use crate::infrastructure::llm::ProviderRegistry;
use crate::infrastructure::processing::{ChunkRangeProcessor, ProcessRequest};

/// Entry point for running a configured agent over a chunk sequence
#[derive(Debug, Clone)]
pub struct AgentEngine {
    agents: Arc<AgentRegistry>,
    providers: Arc<ProviderRegistry>,
    processor: ChunkRangeProcessor,
}

impl AgentEngine {
    pub fn new(
        agents: Arc<AgentRegistry>,
        providers: Arc<ProviderRegistry>,
        processor: ChunkRangeProcessor,
    ) -> Self {
        Self {
            agents,
            providers,
            processor,
        }
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Get an agent by identifier
    pub fn agent(&self, identifier: &str) -> Result<&AgentDefinition, EngineError> {
        self.agents.get(identifier)
    }

    /// Run an agent. Unknown agents and providers fail before any call.
    pub async fn run(
        &self,
        agent_id: &str,
        request: &ProcessRequest,
    ) -> Result<AggregatedResult, EngineError> {
        let agent = self.agents.get(agent_id)?;
        let adapter = self.providers.resolve(agent.provider_name())?;

        info!(
            agent = %agent.identifier(),
            provider = %agent.provider_name(),
            model = %agent.model_name(),
            "Running agent"
        );

        self.processor
            .process(agent, adapter.as_ref(), request)
            .await
    }
}
