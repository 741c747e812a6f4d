//! Prompt template parsing and rendering

mod template;

pub use template::{PromptTemplate, TemplateError, render_template, TEXT_VARIABLE};
