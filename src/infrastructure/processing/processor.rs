//! Chunk range processor - applies one agent to a selected range of chunks

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::StreamExt;
use futures::stream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::domain::{
    AgentCallResult, AgentDefinition, AggregatedResult, CallTiming, ChunkRange, EngineError,
    FailureReason, GenerationRequest, ProviderAdapter, ProviderError, ResultAggregator, TEXT_VARIABLE,
    TextChunk,
};

pub const CHUNK_INDEX_VARIABLE: &str = "chunk_index";
pub const CHUNK_COUNT_VARIABLE: &str = "chunk_count";

/// Processor configuration
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Maximum number of provider calls in flight at once
    pub max_concurrency: usize,
    /// Upper bound for each provider call
    pub call_timeout: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            call_timeout: Duration::from_secs(120),
        }
    }
}

impl ProcessorConfig {
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

/// Everything the caller supplies for one processing request
#[derive(Debug, Clone, Default)]
pub struct ProcessRequest {
    pub chunks: Vec<TextChunk>,
    /// `None` selects every chunk
    pub range: Option<ChunkRange>,
    /// Caller variables such as `length` or `output_format`
    pub variables: HashMap<String, String>,
    pub cancellation: CancellationToken,
}

impl ProcessRequest {
    pub fn new(chunks: Vec<TextChunk>) -> Self {
        Self {
            chunks,
            ..Default::default()
        }
    }

    pub fn with_range(mut self, range: ChunkRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

/// Variables shared by every chunk of a request, lowest precedence first:
/// chunk count, category defaults, agent defaults, caller values.
pub fn build_variables(
    agent: &AgentDefinition,
    chunk_count: usize,
    extra: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut variables = HashMap::new();
    variables.insert(CHUNK_COUNT_VARIABLE.to_string(), chunk_count.to_string());

    for (name, value) in agent.category().default_variables() {
        variables.insert((*name).to_string(), (*value).to_string());
    }

    variables.extend(
        agent
            .variable_defaults()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    variables.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));

    variables
}

/// Chunks must be numbered 1, 2, 3... in order
fn check_contiguous(chunks: &[TextChunk]) -> Result<(), EngineError> {
    match chunks
        .iter()
        .enumerate()
        .find(|(position, chunk)| chunk.index != position + 1)
    {
        Some((position, chunk)) => Err(EngineError::NonContiguousChunks {
            position,
            expected: position + 1,
            found: chunk.index,
        }),
        None => Ok(()),
    }
}

/// Selects chunks by range, runs the agent on each and aggregates the outcomes
#[derive(Debug, Clone, Default)]
pub struct ChunkRangeProcessor {
    config: ProcessorConfig,
    aggregator: ResultAggregator,
}

impl ChunkRangeProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            aggregator: ResultAggregator::new(),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Resolve the range to process. Absent means every chunk.
    pub fn resolve_range(
        chunks: &[TextChunk],
        range: Option<ChunkRange>,
    ) -> Result<Option<ChunkRange>, EngineError> {
        check_contiguous(chunks)?;

        let bounds = match (chunks.first(), chunks.last()) {
            (Some(first), Some(last)) => Some((first.index, last.index)),
            _ => None,
        };

        match (range, bounds) {
            (None, None) => Ok(None),
            (None, Some((first, last))) => Ok(Some(ChunkRange::new(first, last))),
            (Some(range), Some((first, last))) if range.fits_within(first, last) => Ok(Some(range)),
            (Some(range), bounds) => {
                let (first, last) = bounds.unwrap_or((1, 0));
                Err(EngineError::InvalidRange {
                    start: range.start,
                    end: range.end,
                    first,
                    last,
                })
            }
        }
    }

    /// Apply `agent` to the selected chunks.
    ///
    /// Only an invalid range or a failed credential preflight fail the call;
    /// per-chunk failures are recorded in the result.
    pub async fn process(
        &self,
        agent: &AgentDefinition,
        adapter: &dyn ProviderAdapter,
        request: &ProcessRequest,
    ) -> Result<AggregatedResult, EngineError> {
        let Some(range) = Self::resolve_range(&request.chunks, request.range)? else {
            info!(agent = %agent.identifier(), "No chunks to process");
            return Ok(self.aggregator.aggregate(Vec::new()));
        };

        adapter.check_credentials(agent.provider_config())?;

        let selected: Vec<&TextChunk> = request
            .chunks
            .iter()
            .filter(|chunk| range.contains(chunk.index))
            .collect();

        info!(
            agent = %agent.identifier(),
            provider = %adapter.provider_name(),
            range = %range,
            chunks = selected.len(),
            max_concurrency = self.config.max_concurrency,
            "Processing chunk range"
        );

        let shared = build_variables(agent, request.chunks.len(), &request.variables);

        let results: Vec<AgentCallResult> = stream::iter(selected)
            .map(|chunk| self.process_chunk(agent, adapter, chunk, &shared, &request.cancellation))
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let aggregated = self.aggregator.aggregate(results);

        info!(
            agent = %agent.identifier(),
            succeeded = aggregated.succeeded(),
            failed = aggregated.failed(),
            total = aggregated.total_requested(),
            "Chunk range processed"
        );

        Ok(aggregated)
    }

    async fn process_chunk(
        &self,
        agent: &AgentDefinition,
        adapter: &dyn ProviderAdapter,
        chunk: &TextChunk,
        shared: &HashMap<String, String>,
        cancellation: &CancellationToken,
    ) -> AgentCallResult {
        let input_chars = chunk.char_len();

        if cancellation.is_cancelled() {
            debug!(chunk_index = chunk.index, "Skipping chunk after cancellation");
            return AgentCallResult::cancelled(chunk.index, input_chars);
        }

        let started_at = Utc::now();
        let started = Instant::now();
        let elapsed = || CallTiming::new(started_at, started.elapsed().as_millis() as u64);

        let mut variables = shared.clone();
        variables
            .entry(CHUNK_INDEX_VARIABLE.to_string())
            .or_insert_with(|| chunk.index.to_string());
        variables.insert(TEXT_VARIABLE.to_string(), chunk.content.clone());

        let prompt = match agent.prompt_template().render(&variables) {
            Ok(prompt) => prompt,
            Err(error) => {
                warn!(chunk_index = chunk.index, error = %error, "Prompt rendering failed");
                return AgentCallResult::failure(chunk.index, error, input_chars, elapsed());
            }
        };

        debug!(chunk_index = chunk.index, prompt_chars = prompt.len(), "Rendered prompt");
        trace!(chunk_index = chunk.index, prompt = %prompt, "Rendered prompt text");

        let generation = GenerationRequest::for_agent(agent, prompt, self.config.call_timeout);
        let outcome = match timeout(self.config.call_timeout, adapter.execute(&generation)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProviderError::timeout(
                adapter.provider_name(),
                generation.timeout_ms(),
            )),
        };

        match outcome {
            Ok(output) => {
                debug!(chunk_index = chunk.index, output_chars = output.len(), "Chunk processed");
                AgentCallResult::success(chunk.index, output, input_chars, elapsed())
            }
            Err(error) => {
                warn!(chunk_index = chunk.index, error = %error, "Provider call failed");
                AgentCallResult::failure(
                    chunk.index,
                    FailureReason::Provider(error),
                    input_chars,
                    elapsed(),
                )
            }
        }
    }
}
