//! Agent registry - read-only lookup of validated agent definitions

use std::collections::HashMap;

use crate::domain::{AgentCategory, AgentDefinition, EngineError};

/// Validated agents in load order. Immutable once built, so it can be
/// shared across concurrent processing calls without locking.
#[derive(Debug, Default, Clone)]
pub struct AgentRegistry {
    agents: Vec<AgentDefinition>,
    index: HashMap<String, usize>,
}

impl AgentRegistry {
    /// Build from definitions with unique identifiers, keeping their order
    pub(crate) fn from_definitions(agents: Vec<AgentDefinition>) -> Self {
        let index = agents
            .iter()
            .enumerate()
            .map(|(pos, agent)| (agent.identifier().to_string(), pos))
            .collect();

        Self { agents, index }
    }

    /// Get an agent by identifier
    pub fn get(&self, identifier: &str) -> Result<&AgentDefinition, EngineError> {
        self.index
            .get(identifier)
            .map(|&pos| &self.agents[pos])
            .ok_or_else(|| EngineError::agent_not_found(identifier))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    /// Agents of one category, in load order
    pub fn list_by_category(&self, category: &AgentCategory) -> Vec<&AgentDefinition> {
        self.agents
            .iter()
            .filter(|agent| agent.category() == category)
            .collect()
    }

    /// All agents, in load order
    pub fn list_all(&self) -> &[AgentDefinition] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
