//! Unit-based splitting: paragraphs, sentences, wikicode sections or symbol segments

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{SplitError, SplitParams, SplitStrategy, TextChunk, TextSplitter, chunks_from_texts};

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

static WIKI_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^=+[^=\n]+=+[ \t]*$").unwrap());

/// Splits text into units, then groups `chunk_size` units per chunk
#[derive(Debug, Clone, Default)]
pub struct UnitSplitter;

impl UnitSplitter {
    pub fn new() -> Self {
        Self
    }

    fn paragraphs(text: &str) -> Vec<String> {
        non_empty(text.split("\n\n"))
    }

    fn sentences(text: &str) -> Vec<String> {
        let mut units = Vec::new();
        let mut start = 0;

        for m in SENTENCE_END.find_iter(text) {
            // punctuation is a single byte
            units.push(&text[start..m.start() + 1]);
            start = m.end();
        }
        units.push(&text[start..]);

        non_empty(units)
    }

    fn wiki_sections(text: &str) -> Vec<String> {
        non_empty(WIKI_HEADER.split(text))
    }

    fn segments(text: &str, symbol: &str) -> Vec<String> {
        non_empty(text.split(symbol))
    }

    /// Group units into windows of `chunk_size`, sharing `overlap` units
    fn group(units: Vec<String>, chunk_size: Option<usize>, overlap: usize, separator: &str) -> Vec<String> {
        let Some(chunk_size) = chunk_size else {
            return units;
        };

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < units.len() {
            let end = (start + chunk_size).min(units.len());
            chunks.push(units[start..end].join(separator));

            start = if end < units.len() { end - overlap } else { units.len() };
        }

        chunks
    }
}

fn non_empty<'a>(parts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

impl TextSplitter for UnitSplitter {
    fn split(&self, text: &str, params: &SplitParams) -> Result<Vec<TextChunk>, SplitError> {
        params.validate()?;

        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let texts = match params.strategy {
            SplitStrategy::Paragraph => {
                Self::group(Self::paragraphs(text), params.chunk_size, params.overlap, "\n\n")
            }
            SplitStrategy::Sentence => {
                Self::group(Self::sentences(text), params.chunk_size, params.overlap, " ")
            }
            SplitStrategy::Wikicode => {
                let sections = Self::wiki_sections(text);
                if sections.len() <= 1 {
                    vec![text.to_string()]
                } else {
                    Self::group(sections, params.chunk_size, params.overlap, "\n\n")
                }
            }
            SplitStrategy::CustomSymbol => match params.symbol.as_deref() {
                Some(symbol) if !symbol.is_empty() => Self::group(
                    Self::segments(text, symbol),
                    params.chunk_size,
                    params.overlap,
                    symbol,
                ),
                _ => vec![text.to_string()],
            },
        };

        Ok(chunks_from_texts(texts))
    }
}
