//! Agent loading and lookup

mod loader;
mod registry;

pub use loader::{AgentLoader, AgentSource, LoadRejection, LoadReport};
pub use registry::AgentRegistry;
