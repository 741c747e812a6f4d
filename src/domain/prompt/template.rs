//! Prompt template parsing and rendering
//!
//! Supports placeholder syntax `{name}` where name is one or more ASCII
//! alphanumerics or underscores.
//! - `{{` and `}}` render as a literal `{` and `}`
//! - any other brace is kept as-is, so JSON examples inside a prompt survive

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// The variable every agent template must reference
pub const TEXT_VARIABLE: &str = "text";

/// Matches an escape sequence or a placeholder, leftmost first
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{|\}\}|\{([A-Za-z0-9_]+)\}").unwrap());

/// Template processing errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Missing required variable: {name}")]
    MissingVariable { name: String },
}

/// A parsed prompt template
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    /// Original template content
    content: String,
    /// Placeholder names in order of first appearance
    placeholders: Vec<String>,
}

impl PromptTemplate {
    /// Parse a template string and extract its placeholders
    pub fn parse(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut placeholders = Vec::new();
        let mut seen = HashSet::new();

        for cap in TOKEN_PATTERN.captures_iter(&content) {
            if let Some(name) = cap.get(1) {
                let name = name.as_str();
                if seen.insert(name.to_string()) {
                    placeholders.push(name.to_string());
                }
            }
        }

        Self {
            content,
            placeholders,
        }
    }

    /// Get the original template content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Placeholder names, deduplicated, in order of first appearance
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Check whether the template references a placeholder
    pub fn references(&self, name: &str) -> bool {
        self.placeholders.iter().any(|p| p == name)
    }

    /// Render the template, failing on the first placeholder without a value.
    ///
    /// Values not referenced by any placeholder are ignored.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        if let Some(missing) = self.placeholders.iter().find(|p| !values.contains_key(*p)) {
            return Err(TemplateError::MissingVariable {
                name: missing.clone(),
            });
        }

        let mut result = String::with_capacity(self.content.len());
        let mut last = 0;

        for cap in TOKEN_PATTERN.captures_iter(&self.content) {
            let Some(whole) = cap.get(0) else {
                continue;
            };
            result.push_str(&self.content[last..whole.start()]);

            match cap.get(1) {
                Some(name) => result.push_str(&values[name.as_str()]),
                None => result.push_str(&whole.as_str()[..1]),
            }

            last = whole.end();
        }

        result.push_str(&self.content[last..]);
        Ok(result)
    }
}

/// Convenience function to render a template string directly
pub fn render_template(
    template: &str,
    values: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    PromptTemplate::parse(template).render(values)
}
