//! Per-chunk call results and their aggregation

mod aggregator;
mod entity;

pub use aggregator::{AggregatedResult, ResultAggregator};
pub use entity::{AgentCallResult, CallOutcome, CallTiming};
