//! Agent domain - declarative agent definitions

mod document;
mod entity;
mod validation;

pub use document::{AgentDocument, ScalarValue};
pub use entity::{AgentCategory, AgentDefinition, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
pub use validation::{
    validate_identifier, validate_max_tokens, validate_temperature, validate_template,
};
