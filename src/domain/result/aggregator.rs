//! Index-ordered aggregation of per-chunk results

use std::collections::BTreeMap;

use tracing::warn;

use super::entity::AgentCallResult;

/// Collects per-chunk results into an [`AggregatedResult`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultAggregator;

impl ResultAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Sort by chunk index and keep the last result for a repeated index
    pub fn aggregate<I>(&self, results: I) -> AggregatedResult
    where
        I: IntoIterator<Item = AgentCallResult>,
    {
        let mut by_index: BTreeMap<usize, AgentCallResult> = BTreeMap::new();

        for result in results {
            let index = result.chunk_index();
            if by_index.insert(index, result).is_some() {
                warn!(
                    chunk_index = index,
                    "Aggregation defect: duplicate result for chunk, keeping the last one"
                );
            }
        }

        AggregatedResult {
            entries: by_index.into_values().collect(),
        }
    }
}

/// Outcome of one processing request, ordered by chunk index ascending
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregatedResult {
    entries: Vec<AgentCallResult>,
}

impl AggregatedResult {
    pub fn entries(&self) -> &[AgentCallResult] {
        &self.entries
    }

    pub fn get(&self, chunk_index: usize) -> Option<&AgentCallResult> {
        self.entries
            .binary_search_by_key(&chunk_index, AgentCallResult::chunk_index)
            .ok()
            .map(|pos| &self.entries[pos])
    }

    pub fn total_requested(&self) -> usize {
        self.entries.len()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total_requested() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(AgentCallResult::is_success)
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|r| !r.is_success())
            .map(AgentCallResult::chunk_index)
            .collect()
    }

    /// Successful outputs with their chunk index, in index order
    pub fn successful_outputs(&self) -> Vec<(usize, &str)> {
        self.entries
            .iter()
            .filter_map(|r| r.output().map(|text| (r.chunk_index(), text)))
            .collect()
    }

    pub fn concatenated_successful_text(&self, separator: &str) -> String {
        self.successful_outputs()
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Percentage by which successful outputs are shorter than their inputs,
    /// rounded to two decimals. `None` when nothing succeeded.
    pub fn reduction_percentage(&self) -> Option<f64> {
        let (input, output) = self
            .entries
            .iter()
            .filter_map(|r| r.output().map(|text| (r.input_chars(), text.chars().count())))
            .fold((0usize, 0usize), |(i, o), (ri, ro)| (i + ri, o + ro));

        if input == 0 {
            return None;
        }

        let ratio = (1.0 - output as f64 / input as f64) * 100.0;
        Some((ratio * 100.0).round() / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProviderError;
    use crate::domain::result::CallTiming;

    fn ok(index: usize, text: &str) -> AgentCallResult {
        AgentCallResult::success(index, text, 10, CallTiming::skipped())
    }

    fn failed(index: usize) -> AgentCallResult {
        AgentCallResult::failure(
            index,
            ProviderError::unavailable("openai", "down"),
            10,
            CallTiming::skipped(),
        )
    }

    #[test]
    fn test_sorts_by_index() {
        let result = ResultAggregator::new().aggregate(vec![ok(3, "c"), ok(1, "a"), ok(2, "b")]);
        let indices: Vec<usize> = result.entries().iter().map(|r| r.chunk_index()).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(result.concatenated_successful_text(" "), "a b c");
    }

    #[test]
    fn test_duplicate_keeps_last() {
        let result = ResultAggregator::new().aggregate(vec![ok(1, "first"), failed(2), ok(1, "second")]);
        assert_eq!(result.total_requested(), 2);
        assert_eq!(result.get(1).and_then(|r| r.output()), Some("second"));
    }

    #[test]
    fn test_counters_and_failed_indices() {
        let result = ResultAggregator::new().aggregate(vec![ok(1, "a"), failed(2), ok(3, "c")]);
        assert_eq!(result.succeeded(), 2);
        assert_eq!(result.failed(), 1);
        assert_eq!(result.failed_indices(), vec![2]);
        assert!(!result.all_succeeded());
        assert_eq!(result.successful_outputs(), vec![(1, "a"), (3, "c")]);
        assert_eq!(result.concatenated_successful_text("\n"), "a\nc");
        assert!(result.get(4).is_none());
    }

    #[test]
    fn test_empty_result() {
        let result = ResultAggregator::new().aggregate(Vec::new());
        assert!(result.all_succeeded());
        assert_eq!(result.total_requested(), 0);
        assert_eq!(result.concatenated_successful_text(","), "");
        assert_eq!(result.reduction_percentage(), None);
    }

    #[test]
    fn test_reduction_percentage() {
        let result = ResultAggregator::new().aggregate(vec![
            AgentCallResult::success(1, "abc", 9, CallTiming::skipped()),
            failed(2),
        ]);
        assert_eq!(result.reduction_percentage(), Some(66.67));
    }
}
