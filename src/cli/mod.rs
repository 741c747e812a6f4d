//! CLI module for kextract
//!
//! Provides subcommands for working with configured agents:
//! - `agents`: list or inspect loaded agent definitions
//! - `chunks`: preview how a document is split
//! - `run`: apply an agent to a document or a range of its chunks

pub mod agents;
pub mod chunks;
pub mod run;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::io::AsyncReadExt;

use crate::config::AppConfig;
use crate::domain::{SplitParams, SplitStrategy, TextChunk, TextSplitter};
use crate::infrastructure::agent::{AgentLoader, LoadReport};
use crate::infrastructure::llm::ProviderRegistry;
use crate::infrastructure::logging;
use crate::infrastructure::splitter::UnitSplitter;

/// kextract - run configurable LLM agents over chunked documents
#[derive(Parser)]
#[command(name = "kextract")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List or inspect configured agents
    Agents(agents::AgentsArgs),

    /// Split a document and show the resulting chunks
    Chunks(chunks::ChunksArgs),

    /// Run an agent over a document
    Run(run::RunArgs),
}

/// Document input
#[derive(Args, Clone, Debug)]
pub struct InputArgs {
    /// Plain text file to read; stdin when omitted
    #[arg(long, short)]
    pub input: Option<PathBuf>,
}

/// Splitting options
#[derive(Args, Clone, Debug)]
pub struct SplitArgs {
    /// paragraph, sentence, wikicode or custom_symbol
    #[arg(long, default_value = "paragraph")]
    pub strategy: SplitStrategy,

    /// Units per chunk; one unit per chunk when omitted
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Units shared by consecutive chunks
    #[arg(long, default_value_t = 0)]
    pub overlap: usize,

    /// Separator for the custom_symbol strategy
    #[arg(long)]
    pub symbol: Option<String>,
}

impl SplitArgs {
    pub fn params(&self) -> SplitParams {
        SplitParams {
            strategy: self.strategy,
            chunk_size: self.chunk_size,
            overlap: self.overlap,
            symbol: self.symbol.clone(),
        }
    }
}

/// Load `.env`, the application configuration, and install logging
pub fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    Ok(config)
}

/// Load agents from the configured directories
pub fn load_agents(config: &AppConfig, providers: &ProviderRegistry) -> LoadReport {
    AgentLoader::new()
        .with_known_providers(providers.names())
        .load_dirs(&config.agents.directories)
}

/// Read the whole document from a file or stdin
pub async fn read_input(input: &InputArgs) -> anyhow::Result<String> {
    match &input.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Split a document into 1-based chunks
pub fn split_text(text: &str, split: &SplitArgs) -> anyhow::Result<Vec<TextChunk>> {
    UnitSplitter::new()
        .split(text, &split.params())
        .context("Invalid split options")
}
