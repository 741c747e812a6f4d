//! Chunks command - preview how a document is split

use std::fmt::Write as _;

use clap::Args;

use super::{InputArgs, SplitArgs};
use crate::domain::TextChunk;

const PREVIEW_CHARS: usize = 120;

/// Arguments for the chunks command
#[derive(Args, Clone)]
pub struct ChunksArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub split: SplitArgs,

    /// Print whole chunks instead of a one-line preview
    #[arg(long)]
    pub full: bool,
}

/// Run the chunks command
pub async fn run(args: ChunksArgs) -> anyhow::Result<()> {
    super::bootstrap()?;

    let text = super::read_input(&args.input).await?;
    let chunks = super::split_text(&text, &args.split)?;

    print!("{}", render_chunks(&chunks, args.full));
    Ok(())
}

fn render_chunks(chunks: &[TextChunk], full: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} chunks", chunks.len());

    for chunk in chunks {
        if full {
            let _ = writeln!(out, "\n[{}] {} chars\n{}", chunk.index, chunk.char_len(), chunk.content);
        } else {
            let _ = writeln!(out, "[{}] {} chars: {}", chunk.index, chunk.char_len(), preview(&chunk.content));
        }
    }
    out
}

fn preview(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", cut)
}
