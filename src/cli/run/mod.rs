//! Run command - apply an agent to a document or a range of its chunks

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{InputArgs, SplitArgs};
use crate::domain::ChunkRange;
use crate::infrastructure::llm::ProviderRegistry;
use crate::infrastructure::output::{OutputFormat, ResultWriter, save};
use crate::infrastructure::processing::{ChunkRangeProcessor, ProcessRequest};
use crate::infrastructure::services::AgentEngine;

/// Arguments for the run command
#[derive(Args, Clone)]
pub struct RunArgs {
    /// Agent identifier
    pub agent: String,

    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub split: SplitArgs,

    /// Inclusive 1-based chunk range, e.g. 2-5 or 3
    #[arg(long)]
    pub range: Option<ChunkRange>,

    /// Template variable as key=value; repeatable
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// json, txt or md
    #[arg(long, default_value = "json")]
    pub format: OutputFormat,

    /// Save the result here instead of printing it
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

/// Run an agent; per-chunk failures are reported in the result, not as an error
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let providers = Arc::new(ProviderRegistry::with_defaults(&config.providers));
    let report = super::load_agents(&config, &providers);
    for rejection in &report.rejections {
        warn!(%rejection, "Agent rejected");
    }

    let engine = AgentEngine::new(
        Arc::new(report.registry),
        providers,
        ChunkRangeProcessor::new(config.engine.processor_config()),
    );
    let agent = engine.agent(&args.agent)?;

    let text = super::read_input(&args.input).await?;
    let chunks = super::split_text(&text, &args.split)?;

    let cancellation = CancellationToken::new();
    spawn_interrupt_handler(cancellation.clone());

    let mut request = ProcessRequest::new(chunks).with_cancellation(cancellation);
    if let Some(range) = args.range {
        request = request.with_range(range);
    }
    for (name, value) in args.vars {
        request = request.with_variable(name, value);
    }

    let result = engine.run(&args.agent, &request).await?;
    if !result.all_succeeded() {
        warn!(failed = ?result.failed_indices(), "Some chunks failed");
    }

    let rendered = ResultWriter::new(agent, &config.engine.chunk_separator)
        .render(&result, args.format)
        .context("Failed to render result")?;

    match args.output {
        Some(path) => {
            let path = save(&rendered, &path, args.format)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Result written");
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Ctrl-C stops un-started chunks; in-flight calls complete
fn spawn_interrupt_handler(cancellation: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining chunks");
            cancellation.cancel();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var("a=b"), Ok(("a".to_string(), "b".to_string())));
        assert_eq!(parse_var(" k =x=y"), Ok(("k".to_string(), "x=y".to_string())));
        assert_eq!(parse_var("empty="), Ok(("empty".to_string(), String::new())));
        assert!(parse_var("=v").is_err());
        assert!(parse_var("novalue").is_err());
    }
}
