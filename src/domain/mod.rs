//! Domain layer - Core entities, rules and traits

pub mod agent;
pub mod chunk;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod result;

pub use agent::{AgentCategory, AgentDefinition, AgentDocument, ScalarValue};
pub use chunk::{
    ChunkRange, SplitError, SplitParams, SplitStrategy, TextChunk, TextSplitter, chunks_from_texts,
};
pub use error::{ConfigError, EngineError, FailureReason, ProviderError};
pub use llm::{ConfigValue, GenerationRequest, ProviderAdapter, ProviderConfig};
pub use prompt::{PromptTemplate, TEXT_VARIABLE, TemplateError, render_template};
pub use result::{AgentCallResult, AggregatedResult, CallOutcome, CallTiming, ResultAggregator};

#[cfg(test)]
pub use llm::MockProviderAdapter;
