use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::format::{OutputFormat, extract_json};
use crate::domain::{AgentCallResult, AgentCategory, AgentDefinition, AggregatedResult, CallOutcome};

/// Renders an aggregated result for one agent
#[derive(Debug, Clone)]
pub struct ResultWriter<'a> {
    agent: &'a AgentDefinition,
    separator: &'a str,
}

impl<'a> ResultWriter<'a> {
    pub fn new(agent: &'a AgentDefinition, separator: &'a str) -> Self {
        Self { agent, separator }
    }

    pub fn render(&self, result: &AggregatedResult, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Json => self.render_json(result),
            OutputFormat::Txt => Ok(self.render_text(result)),
            OutputFormat::Md => Ok(self.render_markdown(result)),
        }
    }

    fn structured(&self) -> bool {
        self.agent.category() == &AgentCategory::KnowledgeExtraction
    }

    fn render_json(&self, result: &AggregatedResult) -> Result<String, serde_json::Error> {
        let report = JsonReport {
            agent: self.agent.identifier(),
            category: self.agent.category().as_str(),
            model: self.agent.model_name(),
            total_requested: result.total_requested(),
            succeeded: result.succeeded(),
            failed: result.failed(),
            failed_indices: result.failed_indices(),
            reduction_percentage: result.reduction_percentage(),
            chunks: result
                .entries()
                .iter()
                .map(|entry| JsonChunk::from_result(entry, self.structured()))
                .collect(),
        };

        serde_json::to_string_pretty(&report)
    }

    fn render_text(&self, result: &AggregatedResult) -> String {
        result.concatenated_successful_text(self.separator)
    }

    fn render_markdown(&self, result: &AggregatedResult) -> String {
        let mut out = format!("# {}\n\n", self.agent.display_name());

        for entry in result.entries() {
            let _ = write!(out, "## Chunk {}\n\n", entry.chunk_index());
            match entry.outcome() {
                CallOutcome::Success(text) => {
                    let _ = write!(out, "{}\n\n", text.trim_end());
                }
                CallOutcome::Failure(reason) => {
                    let _ = write!(out, "> Chunk failed: {}\n\n", reason);
                }
            }
        }

        let _ = write!(
            out,
            "**Chunks:** {} succeeded, {} failed of {}\n",
            result.succeeded(),
            result.failed(),
            result.total_requested()
        );

        if self.agent.category() == &AgentCategory::Summarization {
            if let Some(reduction) = result.reduction_percentage() {
                let _ = write!(out, "\n**Reduction:** {}%\n", reduction);
            }
        }

        out
    }
}

/// Write `content` to `path`, adding the format's extension when missing
pub fn save(content: &str, path: &Path, format: OutputFormat) -> std::io::Result<PathBuf> {
    let path = match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case(format.extension()) => path.to_path_buf(),
        _ => {
            let mut name = path.as_os_str().to_owned();
            name.push(".");
            name.push(format.extension());
            PathBuf::from(name)
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;

    info!(path = %path.display(), format = %format, "Saved result");
    Ok(path)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    agent: &'a str,
    category: &'a str,
    model: &'a str,
    total_requested: usize,
    succeeded: usize,
    failed: usize,
    failed_indices: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reduction_percentage: Option<f64>,
    chunks: Vec<JsonChunk>,
}

#[derive(Serialize)]
struct JsonChunk {
    index: usize,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    input_chars: usize,
    started_at: DateTime<Utc>,
    duration_ms: u64,
}

impl JsonChunk {
    fn from_result(entry: &AgentCallResult, structured: bool) -> Self {
        let (status, output, error) = match entry.outcome() {
            CallOutcome::Success(text) => {
                let value = structured
                    .then(|| extract_json(text))
                    .flatten()
                    .unwrap_or_else(|| serde_json::Value::String(text.clone()));
                ("success", Some(value), None)
            }
            CallOutcome::Failure(reason) => ("failure", None, Some(reason.to_string())),
        };

        Self {
            index: entry.chunk_index(),
            status,
            output,
            error,
            input_chars: entry.input_chars(),
            started_at: entry.timing().started_at,
            duration_ms: entry.timing().duration_ms,
        }
    }
}
