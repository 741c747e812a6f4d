//! Infrastructure services

mod agent_engine;

pub use agent_engine::AgentEngine;
