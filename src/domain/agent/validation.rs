//! Agent definition validation utilities

use crate::domain::ConfigError;
use crate::domain::prompt::{PromptTemplate, TEXT_VARIABLE};

pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Validate an agent identifier
pub fn validate_identifier(identifier: &str) -> Result<(), ConfigError> {
    if identifier.trim().is_empty() {
        return Err(ConfigError::EmptyIdentifier);
    }

    Ok(())
}

/// Validate temperature value
pub fn validate_temperature(value: f64) -> Result<(), ConfigError> {
    if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&value) {
        return Err(ConfigError::InvalidTemperature {
            value,
            min: MIN_TEMPERATURE,
            max: MAX_TEMPERATURE,
        });
    }

    Ok(())
}

/// Validate max_tokens and narrow it to the request type
pub fn validate_max_tokens(value: i64) -> Result<u32, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::InvalidMaxTokens { value });
    }

    u32::try_from(value).map_err(|_| ConfigError::InvalidMaxTokens { value })
}

/// Every agent operates on a body of text
pub fn validate_template(template: &PromptTemplate) -> Result<(), ConfigError> {
    if !template.references(TEXT_VARIABLE) {
        return Err(ConfigError::MissingTextPlaceholder);
    }

    Ok(())
}

/// Require a non-blank string field
pub fn require(field: &str, value: Option<&str>) -> Result<String, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::missing_field(field)),
    }
}
