//! Text splitting strategy trait and types

use std::fmt::Debug;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::TextChunk;

/// Splitting parameter errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("chunk_size must be greater than 0")]
    ZeroChunkSize,

    #[error("overlap ({overlap}) must be less than chunk_size ({chunk_size})")]
    OverlapTooLarge { overlap: usize, chunk_size: usize },

    #[error("Unknown split strategy: {0}")]
    UnknownStrategy(String),
}

/// Unit a document is split on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    #[default]
    Paragraph,
    Sentence,
    Wikicode,
    CustomSymbol,
}

impl SplitStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Sentence => "sentence",
            Self::Wikicode => "wikicode",
            Self::CustomSymbol => "custom_symbol",
        }
    }
}

impl FromStr for SplitStrategy {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paragraph" => Ok(Self::Paragraph),
            "sentence" => Ok(Self::Sentence),
            "wikicode" => Ok(Self::Wikicode),
            "custom_symbol" | "symbol" => Ok(Self::CustomSymbol),
            other => Err(SplitError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Parameters for splitting
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SplitParams {
    pub strategy: SplitStrategy,
    /// Units per chunk; `None` puts every unit in its own chunk
    pub chunk_size: Option<usize>,
    /// Units shared by consecutive chunks
    pub overlap: usize,
    /// Separator for the custom symbol strategy
    pub symbol: Option<String>,
}

impl SplitParams {
    pub fn new(strategy: SplitStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<(), SplitError> {
        match self.chunk_size {
            Some(0) => Err(SplitError::ZeroChunkSize),
            Some(chunk_size) if self.overlap >= chunk_size => Err(SplitError::OverlapTooLarge {
                overlap: self.overlap,
                chunk_size,
            }),
            _ => Ok(()),
        }
    }
}

/// Produces the ordered, 1-based chunk sequence the engine consumes
pub trait TextSplitter: Send + Sync + Debug {
    fn split(&self, text: &str, params: &SplitParams) -> Result<Vec<TextChunk>, SplitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(SplitParams::default().validate().is_ok());
        assert!(SplitParams::default().with_chunk_size(3).with_overlap(2).validate().is_ok());
        assert_eq!(
            SplitParams::default().with_chunk_size(0).validate(),
            Err(SplitError::ZeroChunkSize)
        );
        assert_eq!(
            SplitParams::default().with_chunk_size(2).with_overlap(2).validate(),
            Err(SplitError::OverlapTooLarge {
                overlap: 2,
                chunk_size: 2
            })
        );
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("Sentence".parse::<SplitStrategy>(), Ok(SplitStrategy::Sentence));
        assert_eq!("custom_symbol".parse::<SplitStrategy>(), Ok(SplitStrategy::CustomSymbol));
        assert!("words".parse::<SplitStrategy>().is_err());
    }
}
