//! Chunk range processing

mod processor;

pub use processor::{ChunkRangeProcessor, ProcessRequest, ProcessorConfig, build_variables};
