use chrono::{DateTime, Utc};

use crate::domain::FailureReason;

/// When a call started and how long it took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTiming {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl CallTiming {
    pub fn new(started_at: DateTime<Utc>, duration_ms: u64) -> Self {
        Self {
            started_at,
            duration_ms,
        }
    }

    /// Timing for a chunk that never reached the provider
    pub fn skipped() -> Self {
        Self::new(Utc::now(), 0)
    }
}

/// Success carries the generated text, failure the reason
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Success(String),
    Failure(FailureReason),
}

/// Outcome of applying an agent to one chunk. Immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCallResult {
    chunk_index: usize,
    outcome: CallOutcome,
    input_chars: usize,
    timing: CallTiming,
}

impl AgentCallResult {
    pub fn success(
        chunk_index: usize,
        output: impl Into<String>,
        input_chars: usize,
        timing: CallTiming,
    ) -> Self {
        Self {
            chunk_index,
            outcome: CallOutcome::Success(output.into()),
            input_chars,
            timing,
        }
    }

    pub fn failure(
        chunk_index: usize,
        reason: impl Into<FailureReason>,
        input_chars: usize,
        timing: CallTiming,
    ) -> Self {
        Self {
            chunk_index,
            outcome: CallOutcome::Failure(reason.into()),
            input_chars,
            timing,
        }
    }

    /// A chunk the processor never started
    pub fn cancelled(chunk_index: usize, input_chars: usize) -> Self {
        Self::failure(
            chunk_index,
            FailureReason::Cancelled,
            input_chars,
            CallTiming::skipped(),
        )
    }

    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    pub fn outcome(&self) -> &CallOutcome {
        &self.outcome
    }

    pub fn input_chars(&self) -> usize {
        self.input_chars
    }

    pub fn timing(&self) -> &CallTiming {
        &self.timing
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CallOutcome::Success(_))
    }

    pub fn output(&self) -> Option<&str> {
        match &self.outcome {
            CallOutcome::Success(text) => Some(text),
            CallOutcome::Failure(_) => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match &self.outcome {
            CallOutcome::Success(_) => None,
            CallOutcome::Failure(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProviderError;

    #[test]
    fn test_success_accessors() {
        let result = AgentCallResult::success(3, "summary", 120, CallTiming::skipped());
        assert!(result.is_success());
        assert_eq!(result.chunk_index(), 3);
        assert_eq!(result.output(), Some("summary"));
        assert!(result.failure_reason().is_none());
    }

    #[test]
    fn test_failure_accessors() {
        let result = AgentCallResult::failure(
            2,
            ProviderError::timeout("openai", 500),
            10,
            CallTiming::skipped(),
        );
        assert!(!result.is_success());
        assert_eq!(result.output(), None);
        assert!(matches!(
            result.failure_reason(),
            Some(FailureReason::Provider(ProviderError::Timeout { .. }))
        ));
    }

    #[test]
    fn test_cancelled() {
        let result = AgentCallResult::cancelled(4, 7);
        assert_eq!(result.failure_reason(), Some(&FailureReason::Cancelled));
        assert_eq!(result.timing().duration_ms, 0);
    }
}
