//! Infrastructure layer - External service implementations

pub mod agent;
pub mod llm;
pub mod logging;
pub mod output;
pub mod processing;
pub mod services;
pub mod splitter;
