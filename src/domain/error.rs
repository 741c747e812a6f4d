use thiserror::Error;

use super::prompt::TemplateError;

/// Reasons an agent configuration source is rejected at load time
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read configuration: {message}")]
    Io { message: String },

    #[error("Failed to parse configuration: {message}")]
    Parse { message: String },

    #[error("Agent identifier cannot be empty")]
    EmptyIdentifier,

    #[error("Duplicate agent identifier: {identifier}")]
    DuplicateIdentifier { identifier: String },

    #[error("Invalid temperature {value}: must be between {min} and {max}")]
    InvalidTemperature { value: f64, min: f64, max: f64 },

    #[error("Invalid max_tokens {value}: must be greater than 0")]
    InvalidMaxTokens { value: i64 },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Prompt template must contain the {{text}} placeholder")]
    MissingTextPlaceholder,
}

impl ConfigError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn duplicate(identifier: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            identifier: identifier.into(),
        }
    }
}

/// Errors raised by a provider adapter for a single call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("Unknown provider: {provider}")]
    UnknownProvider { provider: String },

    #[error("Missing credential for provider {provider}: environment variable '{variable}' is not set")]
    MissingCredential { provider: String, variable: String },

    #[error("Provider {provider} timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("Provider {provider} unavailable: {message}")]
    ProviderUnavailable { provider: String, message: String },

    #[error("Provider {provider} rejected credentials or quota: {message}")]
    QuotaOrAuthFailure { provider: String, message: String },

    #[error("Provider {provider} returned an invalid response: {message}")]
    InvalidResponse { provider: String, message: String },
}

impl ProviderError {
    pub fn unknown(provider: impl Into<String>) -> Self {
        Self::UnknownProvider {
            provider: provider.into(),
        }
    }

    pub fn missing_credential(provider: impl Into<String>, variable: impl Into<String>) -> Self {
        Self::MissingCredential {
            provider: provider.into(),
            variable: variable.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            provider: provider.into(),
            timeout_ms,
        }
    }

    pub fn unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn quota_or_auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QuotaOrAuthFailure {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Only transport-level unavailability is worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ProviderUnavailable { .. })
    }
}

/// Failures that abort a whole processing request before any model call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("Invalid chunk range {start}-{end}: valid indices are {first}-{last}")]
    InvalidRange {
        start: usize,
        end: usize,
        first: usize,
        last: usize,
    },

    #[error("Chunk indices must ascend by one from 1: expected {expected} at position {position}, found {found}")]
    NonContiguousChunks {
        position: usize,
        expected: usize,
        found: usize,
    },

    #[error("Agent not found: {identifier}")]
    AgentNotFound { identifier: String },

    #[error("Unknown provider: {provider}")]
    UnknownProvider { provider: String },

    #[error("Missing credential for provider {provider}: environment variable '{variable}' is not set")]
    MissingCredential { provider: String, variable: String },

    #[error("Provider preflight failed: {0}")]
    Preflight(ProviderError),
}

impl EngineError {
    pub fn agent_not_found(identifier: impl Into<String>) -> Self {
        Self::AgentNotFound {
            identifier: identifier.into(),
        }
    }

    pub fn unknown_provider(provider: impl Into<String>) -> Self {
        Self::UnknownProvider {
            provider: provider.into(),
        }
    }
}

impl From<ProviderError> for EngineError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::MissingCredential { provider, variable } => {
                Self::MissingCredential { provider, variable }
            }
            ProviderError::UnknownProvider { provider } => Self::UnknownProvider { provider },
            other => Self::Preflight(other),
        }
    }
}

/// Why a single chunk did not produce output
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FailureReason {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("Cancelled before the call started")]
    Cancelled,
}
