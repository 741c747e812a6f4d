use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::llm::ProvidersConfig;
use crate::infrastructure::processing::ProcessorConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where agent configuration files are discovered
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub directories: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_concurrency: usize,
    pub call_timeout_secs: u64,
    /// Joins successful chunk outputs in text output
    pub chunk_separator: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            directories: vec![PathBuf::from("config/agents")],
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            call_timeout_secs: 120,
            chunk_separator: "\n\n".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig::default()
            .with_max_concurrency(self.max_concurrency)
            .with_call_timeout(Duration::from_secs(self.call_timeout_secs))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("KEXTRACT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
