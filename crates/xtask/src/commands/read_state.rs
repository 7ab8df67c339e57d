//! Read and inspect world snapshot files
//!
//! Deserializes a bincode snapshot and displays its contents.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use park_core::{Finance, WorldState};
use park_runtime::SnapshotStore;

/// Read and inspect world snapshot files
#[derive(Parser)]
pub struct ReadState {
    /// Snapshot file written by a snapshot store (`{name}.bin`)
    #[arg(value_name = "SNAPSHOT")]
    path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Summary view (map, finances, object counts and state root)
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

impl ReadState {
    pub fn execute(self) -> Result<()> {
        let world = SnapshotStore::load_file(&self.path)
            .with_context(|| format!("Failed to load snapshot: {}", self.path.display()))?;

        match self.format {
            OutputFormat::Summary => print_summary(&self.path, &world),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&world)
                    .context("Failed to serialize state to JSON")?;
                println!("{}", json);
            }
            OutputFormat::Debug => println!("{:#?}", world),
        }

        Ok(())
    }
}

fn print_summary(path: &PathBuf, world: &WorldState) {
    println!("{} {}", style("Snapshot:").bold().cyan(), path.display());
    println!(
        "{} {}",
        style("State Root:").bold().cyan(),
        hex::encode(world.state_root())
    );
    println!();

    println!("{}", style("=== Park ===").bold().green());
    println!("  Map size: {}", world.map.size());
    println!("  Paused: {}", world.park.paused);
    println!("  No money: {}", world.park.no_money);
    println!("  Funds: {}", world.finance.funds());
    println!();

    let paths = world.map.tiles().filter(|tile| tile.path.is_some()).count();
    let elements: usize = world.map.tiles().map(|tile| tile.elements.len()).sum();

    println!("{}", style("=== Objects ===").bold().green());
    println!("  Footpaths: {}", paths);
    println!("  Tile elements: {}", elements);
    println!("  Banners: {}", world.banners.len());
    println!("  Rides: {}", world.rides.len());
    for (id, ride) in world.rides.iter() {
        println!(
            "    {} {:?} ({:?})",
            style(format!("#{id}")).dim(),
            ride.ride_type,
            ride.status
        );
    }
    println!("  Players: {}", world.players.iter().count());
}
