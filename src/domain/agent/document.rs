//! Declarative agent configuration document (unvalidated)

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar configuration value; tables and arrays are not accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// One agent configuration source as written by the operator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub agent_type: Option<String>,
    #[serde(default)]
    pub model_provider: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<i64>,
    #[serde(default)]
    pub prompt_template: Option<String>,
    #[serde(default)]
    pub prompt_variables: Vec<String>,
    #[serde(default)]
    pub prompt_defaults: BTreeMap<String, ScalarValue>,
    #[serde(default)]
    pub provider_config: BTreeMap<String, ScalarValue>,
}

impl AgentDocument {
    /// Minimal document with the required fields set
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            model_provider: Some(provider.into()),
            model_name: Some(model.into()),
            prompt_template: Some(template.into()),
            ..Default::default()
        }
    }

    pub fn with_agent_type(mut self, agent_type: impl Into<String>) -> Self {
        self.agent_type = Some(agent_type.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: i64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.prompt_defaults.insert(name.into(), value.into());
        self
    }

    pub fn with_provider_setting(mut self, key: impl Into<String>, value: &str) -> Self {
        self.provider_config.insert(key.into(), value.into());
        self
    }
}
