use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// File format for saved results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Txt,
    Md,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Txt => "txt",
            Self::Md => "md",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Txt),
            "md" | "markdown" => Ok(Self::Md),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Structured JSON carried by a model output: the first ```json fence,
/// otherwise the whole text when it parses as JSON.
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    if let Some((_, rest)) = text.split_once("```json") {
        if let Some((fenced, _)) = rest.split_once("```") {
            return serde_json::from_str(fenced.trim()).ok();
        }
    }

    serde_json::from_str(text.trim()).ok()
}
