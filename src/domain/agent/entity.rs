//! Agent definition entity and related types

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::document::AgentDocument;
use super::validation::{
    require, validate_identifier, validate_max_tokens, validate_template, validate_temperature,
};
use crate::domain::ConfigError;
use crate::domain::llm::{ConfigValue, ProviderConfig};
use crate::domain::prompt::PromptTemplate;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// What kind of work an agent does. Open to new values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentCategory {
    Summarization,
    KnowledgeExtraction,
    QuestionAnswering,
    Custom,
    Other(String),
}

impl AgentCategory {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Summarization => "summarization",
            Self::KnowledgeExtraction => "knowledge_extraction",
            Self::QuestionAnswering => "question_answering",
            Self::Custom => "custom",
            Self::Other(name) => name,
        }
    }

    /// Variable values every agent of this category starts from
    pub fn default_variables(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Summarization => &[("length", "medium"), ("focus", "general")],
            Self::KnowledgeExtraction => &[("output_format", "json")],
            _ => &[],
        }
    }
}

impl From<&str> for AgentCategory {
    fn from(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "summarization" => Self::Summarization,
            "knowledge_extraction" => Self::KnowledgeExtraction,
            "question_answering" => Self::QuestionAnswering,
            "custom" | "" => Self::Custom,
            _ => Self::Other(normalized),
        }
    }
}

impl From<String> for AgentCategory {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<AgentCategory> for String {
    fn from(category: AgentCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for AgentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated agent: prompt template, target provider and generation parameters.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDefinition {
    identifier: String,
    display_name: String,
    description: String,
    category: AgentCategory,
    provider_name: String,
    model_name: String,
    temperature: f64,
    max_tokens: u32,
    prompt_template: PromptTemplate,
    declared_variables: BTreeSet<String>,
    variable_defaults: BTreeMap<String, String>,
    provider_config: ProviderConfig,
}

impl AgentDefinition {
    /// Validate a configuration document into a definition
    pub fn from_document(
        identifier: impl Into<String>,
        document: AgentDocument,
    ) -> Result<Self, ConfigError> {
        let identifier = identifier.into().trim().to_string();
        validate_identifier(&identifier)?;

        let provider_name = require("model_provider", document.model_provider.as_deref())?;
        let model_name = require("model_name", document.model_name.as_deref())?;

        let temperature = document.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        validate_temperature(temperature)?;

        let max_tokens = match document.max_tokens {
            Some(value) => validate_max_tokens(value)?,
            None => DEFAULT_MAX_TOKENS,
        };

        let raw_template = document
            .prompt_template
            .ok_or_else(|| ConfigError::missing_field("prompt_template"))?;
        let prompt_template = PromptTemplate::parse(raw_template);
        validate_template(&prompt_template)?;

        let mut provider_config = ProviderConfig::new();
        for (key, value) in &document.provider_config {
            provider_config.insert(key.clone(), ConfigValue::parse(&value.to_string()));
        }

        let display_name = document
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| identifier.clone());

        Ok(Self {
            identifier,
            display_name,
            description: document.description.unwrap_or_default(),
            category: document
                .agent_type
                .map(AgentCategory::from)
                .unwrap_or(AgentCategory::Custom),
            provider_name: provider_name.to_lowercase(),
            model_name,
            temperature,
            max_tokens,
            prompt_template,
            declared_variables: document.prompt_variables.into_iter().collect(),
            variable_defaults: document
                .prompt_defaults
                .into_iter()
                .map(|(k, v)| (k, v.to_string()))
                .collect(),
            provider_config,
        })
    }

    // Getters

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &AgentCategory {
        &self.category
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn prompt_template(&self) -> &PromptTemplate {
        &self.prompt_template
    }

    pub fn declared_variables(&self) -> &BTreeSet<String> {
        &self.declared_variables
    }

    pub fn variable_defaults(&self) -> &BTreeMap<String, String> {
        &self.variable_defaults
    }

    pub fn provider_config(&self) -> &ProviderConfig {
        &self.provider_config
    }

    /// Placeholders used by the template but not declared (besides `text`)
    pub fn undeclared_placeholders(&self) -> Vec<&str> {
        self.prompt_template
            .placeholders()
            .iter()
            .filter(|p| p.as_str() != crate::domain::prompt::TEXT_VARIABLE)
            .filter(|p| !self.declared_variables.contains(p.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Declared variables the template never references
    pub fn unused_declared_variables(&self) -> Vec<&str> {
        self.declared_variables
            .iter()
            .filter(|v| !self.prompt_template.references(v))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summarizer_document() -> AgentDocument {
        AgentDocument::new("OpenAI", "gpt-4o-mini", "Summarize {text} ({length}, {focus})")
            .with_agent_type("summarization")
            .with_temperature(0.3)
            .with_max_tokens(500)
    }

    #[test]
    fn test_from_document() {
        let mut document = summarizer_document();
        document.name = Some("Summarizer".to_string());
        document.prompt_variables = vec!["length".to_string(), "focus".to_string()];

        let agent = AgentDefinition::from_document("summarizer", document).unwrap();

        assert_eq!(agent.identifier(), "summarizer");
        assert_eq!(agent.display_name(), "Summarizer");
        assert_eq!(agent.category(), &AgentCategory::Summarization);
        assert_eq!(agent.provider_name(), "openai");
        assert_eq!(agent.model_name(), "gpt-4o-mini");
        assert_eq!(agent.temperature(), 0.3);
        assert_eq!(agent.max_tokens(), 500);
        assert!(agent.undeclared_placeholders().is_empty());
    }

    #[test]
    fn test_defaults_applied() {
        let document = AgentDocument::new("echo", "none", "{text}");
        let agent = AgentDefinition::from_document("plain", document).unwrap();

        assert_eq!(agent.display_name(), "plain");
        assert_eq!(agent.category(), &AgentCategory::Custom);
        assert_eq!(agent.temperature(), DEFAULT_TEMPERATURE);
        assert_eq!(agent.max_tokens(), DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_missing_text_placeholder_rejected() {
        let document = AgentDocument::new("openai", "gpt-4o", "Summarize {input}");
        assert_eq!(
            AgentDefinition::from_document("bad", document),
            Err(ConfigError::MissingTextPlaceholder)
        );
    }

    #[test]
    fn test_missing_provider_rejected() {
        let mut document = summarizer_document();
        document.model_provider = None;
        assert_eq!(
            AgentDefinition::from_document("x", document),
            Err(ConfigError::missing_field("model_provider"))
        );
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let document = summarizer_document().with_temperature(3.5);
        assert!(matches!(
            AgentDefinition::from_document("x", document),
            Err(ConfigError::InvalidTemperature { .. })
        ));

        let document = summarizer_document().with_max_tokens(0);
        assert!(matches!(
            AgentDefinition::from_document("x", document),
            Err(ConfigError::InvalidMaxTokens { value: 0 })
        ));
    }

    #[test]
    fn test_provider_config_env_reference() {
        let document = summarizer_document()
            .with_provider_setting("api_key", "${?OPENAI_API_KEY}")
            .with_provider_setting("base_url", "http://localhost:8080");
        let agent = AgentDefinition::from_document("s", document).unwrap();

        assert_eq!(
            agent.provider_config().get("api_key").and_then(ConfigValue::env_var),
            Some("OPENAI_API_KEY")
        );
        assert_eq!(
            agent.provider_config().resolve("base_url").as_deref(),
            Some("http://localhost:8080")
        );
    }

    #[test]
    fn test_declared_variable_reporting() {
        let mut document = summarizer_document();
        document.prompt_variables = vec!["length".to_string(), "audience".to_string()];
        let agent = AgentDefinition::from_document("s", document).unwrap();

        assert_eq!(agent.undeclared_placeholders(), vec!["focus"]);
        assert_eq!(agent.unused_declared_variables(), vec!["audience"]);
    }

    #[test]
    fn test_category_round_trip_and_extension() {
        assert_eq!(AgentCategory::from("Knowledge_Extraction"), AgentCategory::KnowledgeExtraction);
        assert_eq!(
            AgentCategory::from("translation"),
            AgentCategory::Other("translation".to_string())
        );
        assert_eq!(AgentCategory::from("translation").to_string(), "translation");
        assert_eq!(
            AgentCategory::Summarization.default_variables(),
            &[("length", "medium"), ("focus", "general")]
        );
    }
}
