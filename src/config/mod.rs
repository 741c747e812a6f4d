//! Application configuration

mod app_config;

pub use app_config::{AgentsConfig, AppConfig, EngineConfig, LogFormat, LoggingConfig};
