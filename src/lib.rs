//! kextract
//!
//! Runs declaratively configured LLM agents over chunked plain-text documents:
//! - Agent definitions loaded and validated from TOML files
//! - Prompt templates with per-call variable substitution
//! - OpenAI and Gemini adapters with credentials resolved from the environment
//! - Bounded-concurrency processing of a 1-based chunk range with per-chunk failures

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
