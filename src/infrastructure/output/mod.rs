//! Persistence collaborator: renders aggregated results as JSON, text or Markdown

mod format;
mod writer;

pub use format::{OutputFormat, extract_json};
pub use writer::{ResultWriter, save};
