//! kblink command-line entry point

use clap::Parser;
use kblink_cli::commands::Commands;

/// Knowledge-base entity linking
#[derive(Debug, Parser)]
#[command(name = "kblink", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    Cli::parse().command.execute()
}
