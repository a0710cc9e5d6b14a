//! Prospector CLI: multi-source business lead aggregation.
//!
//! Discovers businesses across pluggable sources, merges them into
//! canonical profiles with scored contacts, and exports the results.

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
