//! Provider-specific settings with lazily resolved environment references

use std::collections::BTreeMap;
use std::env;
use std::fmt;

use crate::domain::ProviderError;

/// A single provider setting.
///
/// `${?NAME}` in configuration becomes `EnvRef("NAME")` and is only looked up
/// when a call needs it.
#[derive(Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Literal(String),
    EnvRef(String),
}

impl ConfigValue {
    /// Parse a raw configuration string
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        match trimmed
            .strip_prefix("${?")
            .and_then(|rest| rest.strip_suffix('}'))
        {
            Some(name) if !name.is_empty() => Self::EnvRef(name.to_string()),
            _ => Self::Literal(raw.to_string()),
        }
    }

    /// Environment variable name, if this is a reference
    pub fn env_var(&self) -> Option<&str> {
        match self {
            Self::EnvRef(name) => Some(name),
            Self::Literal(_) => None,
        }
    }

    /// Resolve to a concrete value. Unset or empty variables resolve to `None`.
    pub fn resolve(&self) -> Option<String> {
        match self {
            Self::Literal(value) => Some(value.clone()),
            Self::EnvRef(name) => read_env(name),
        }
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(_) => write!(f, "Literal(<redacted>)"),
            Self::EnvRef(name) => write!(f, "EnvRef({})", name),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(_) => write!(f, "<literal>"),
            Self::EnvRef(name) => write!(f, "${{?{}}}", name),
        }
    }
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Provider settings for one agent
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    entries: BTreeMap<String, ConfigValue>,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, raw: &str) -> Self {
        self.insert(key, ConfigValue::parse(raw));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve an optional setting
    pub fn resolve(&self, key: &str) -> Option<String> {
        self.entries.get(key).and_then(ConfigValue::resolve)
    }

    /// Resolve a required credential.
    ///
    /// Uses the configured entry when present, otherwise falls back to
    /// `default_env`. Fails with `MissingCredential` naming the variable
    /// that was consulted.
    pub fn resolve_credential(
        &self,
        key: &str,
        provider: &str,
        default_env: &str,
    ) -> Result<String, ProviderError> {
        match self.entries.get(key) {
            Some(ConfigValue::Literal(value)) => Ok(value.clone()),
            Some(ConfigValue::EnvRef(name)) => {
                read_env(name).ok_or_else(|| ProviderError::missing_credential(provider, name))
            }
            None => read_env(default_env)
                .ok_or_else(|| ProviderError::missing_credential(provider, default_env)),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_reference() {
        assert_eq!(
            ConfigValue::parse("${?OPENAI_API_KEY}"),
            ConfigValue::EnvRef("OPENAI_API_KEY".to_string())
        );
        assert_eq!(
            ConfigValue::parse("https://example.test"),
            ConfigValue::Literal("https://example.test".to_string())
        );
        assert_eq!(ConfigValue::parse("${?}"), ConfigValue::Literal("${?}".to_string()));
    }

    #[test]
    fn test_debug_never_shows_values() {
        let config = ProviderConfig::new()
            .with("api_key", "sk-secret-value")
            .with("region", "${?KX_TEST_REGION}");

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret-value"));
        assert!(rendered.contains("api_key"));

        let value = format!("{:?}", config.get("api_key").unwrap());
        assert_eq!(value, "Literal(<redacted>)");
    }

    #[test]
    fn test_resolve_credential_from_reference() {
        // SAFETY: Test uses a variable name unique to this test
        unsafe { env::set_var("KX_TEST_CFG_KEY_SET", "sk-from-env") };

        let config = ProviderConfig::new().with("api_key", "${?KX_TEST_CFG_KEY_SET}");
        let key = config
            .resolve_credential("api_key", "openai", "KX_UNUSED_DEFAULT")
            .unwrap();
        assert_eq!(key, "sk-from-env");

        // SAFETY: Test cleanup
        unsafe { env::remove_var("KX_TEST_CFG_KEY_SET") };
    }

    #[test]
    fn test_resolve_credential_missing_reference() {
        let config = ProviderConfig::new().with("api_key", "${?KX_TEST_CFG_NEVER_SET}");
        let error = config
            .resolve_credential("api_key", "gemini", "KX_UNUSED_DEFAULT")
            .unwrap_err();

        assert_eq!(
            error,
            ProviderError::missing_credential("gemini", "KX_TEST_CFG_NEVER_SET")
        );
    }

    #[test]
    fn test_resolve_credential_falls_back_to_default_variable() {
        let config = ProviderConfig::new();
        let error = config
            .resolve_credential("api_key", "openai", "KX_TEST_CFG_DEFAULT_UNSET")
            .unwrap_err();

        assert_eq!(
            error,
            ProviderError::missing_credential("openai", "KX_TEST_CFG_DEFAULT_UNSET")
        );
    }

    #[test]
    fn test_literal_credential() {
        let config = ProviderConfig::new().with("api_key", "literal-key");
        assert_eq!(
            config.resolve_credential("api_key", "openai", "X").unwrap(),
            "literal-key"
        );
    }
}
