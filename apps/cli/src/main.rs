//! Topicflow CLI: topic research pipeline.
//!
//! Acquires skill-tailored summaries for topics, scores them, and files
//! them into sections, digests, and a run log kept as JSON documents.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
