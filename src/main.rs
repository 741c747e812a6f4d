use clap::Parser;
use kextract::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Agents(args) => cli::agents::run(args).await,
        Command::Chunks(args) => cli::chunks::run(args).await,
        Command::Run(args) => cli::run::run(args).await,
    }
}
