//! Development tasks for the park engine
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{ReadActions, ReadState, Replay};

/// Development tasks for the park engine
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for the park engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Read and inspect action log files
    ReadActions(ReadActions),

    /// Read and inspect world snapshot files
    ReadState(ReadState),

    /// Re-run an action log from a snapshot and print the state root
    Replay(Replay),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for PARK_* runtime settings)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::ReadActions(cmd) => cmd.execute(),
        Command::ReadState(cmd) => cmd.execute(),
        Command::Replay(cmd) => cmd.execute(),
    }
}
