use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One indexed segment of a document. Indices are 1-based and contiguous
/// in split order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub index: usize,
    pub content: String,
}

impl TextChunk {
    pub fn new(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
        }
    }

    /// Content length in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Number split texts from 1 in order
pub fn chunks_from_texts<I, S>(texts: I) -> Vec<TextChunk>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| TextChunk::new(i + 1, text))
        .collect()
}

/// Inclusive range of chunk indices selected for processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRange {
    pub start: usize,
    pub end: usize,
}

impl ChunkRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A single chunk
    pub fn single(index: usize) -> Self {
        Self::new(index, index)
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }

    /// Number of indices covered; zero when inverted
    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the range is well-formed and lies within `[first, last]`
    pub fn fits_within(&self, first: usize, last: usize) -> bool {
        self.start <= self.end && self.start >= first && self.end <= last
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for ChunkRange {
    type Err = String;

    /// Parses `"S-E"` or a single index `"N"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("Invalid chunk index '{}'", part.trim()))
        };

        match s.split_once('-') {
            Some((start, end)) => Ok(Self::new(parse(start)?, parse(end)?)),
            None => Ok(Self::single(parse(s)?)),
        }
    }
}
