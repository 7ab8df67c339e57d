//! Re-run an action log against a snapshot
//!
//! Replays every logged entry through a fresh session and reports the final
//! state root, optionally checking it against an expected value.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use console::style;

use park_core::WorldState;
use park_runtime::{ActionLogReader, RuntimeConfig, SnapshotStore, replay};

/// Re-run an action log from a snapshot and print the state root
#[derive(Parser)]
pub struct Replay {
    /// Action log to replay
    #[arg(value_name = "LOG")]
    log: PathBuf,

    /// Starting snapshot (defaults to a fresh park built from the environment config)
    #[arg(short, long, value_name = "SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Expected final state root (hex); the command fails on a mismatch
    #[arg(short, long, value_name = "HEX")]
    expect_root: Option<String>,

    /// Write the final world to this snapshot directory under the given name
    #[arg(long, value_names = ["DIR", "NAME"], num_args = 2)]
    save: Option<Vec<String>>,

    /// Print every result, not only refusals
    #[arg(short, long)]
    verbose: bool,
}

impl Replay {
    pub fn execute(self) -> Result<()> {
        let config = RuntimeConfig::from_env().context("Invalid runtime configuration")?;
        let start = match &self.snapshot {
            Some(path) => SnapshotStore::load_file(path)
                .with_context(|| format!("Failed to load snapshot: {}", path.display()))?,
            None => WorldState::new(&config.engine),
        };
        let entries = ActionLogReader::read_all(&self.log)
            .with_context(|| format!("Failed to read action log: {}", self.log.display()))?;

        let outcome = replay(start, &entries, config).context("Replay failed")?;

        println!("{} {}", style("Action Log:").bold().cyan(), self.log.display());
        println!("{} {}", style("Entries:").bold().cyan(), entries.len());
        let refused = outcome.results.iter().filter(|r| !r.is_ok()).count();
        println!("{} {}", style("Refused:").bold().cyan(), refused);
        println!();

        for (index, (entry, result)) in entries.iter().zip(&outcome.results).enumerate() {
            if self.verbose || !result.is_ok() {
                println!(
                    "  {} tick {} {} cost {}",
                    style(format!("[{index}]")).dim(),
                    entry.tick,
                    if result.is_ok() {
                        style(result.status.to_string()).green()
                    } else {
                        style(result.status.to_string()).red()
                    },
                    result.cost
                );
            }
        }

        let root = outcome.state_root_hex();
        println!("{} {}", style("State Root:").bold().cyan(), root);

        if let Some(values) = &self.save {
            if let [dir, name] = values.as_slice() {
                let path = SnapshotStore::new(dir)?.save(name, &outcome.world)?;
                println!("{} {}", style("Saved:").bold().cyan(), path.display());
            }
        }

        if let Some(expected) = &self.expect_root {
            if !expected.eq_ignore_ascii_case(&root) {
                bail!("State root mismatch: expected {expected}, got {root}");
            }
            println!("{}", style("State root matches").bold().green());
        }

        Ok(())
    }
}
