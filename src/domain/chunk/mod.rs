//! Chunk addressing types and the text splitting collaborator interface

mod entity;
mod splitter;

pub use entity::{ChunkRange, TextChunk, chunks_from_texts};
pub use splitter::{SplitError, SplitParams, SplitStrategy, TextSplitter};
