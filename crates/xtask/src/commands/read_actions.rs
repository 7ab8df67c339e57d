//! Read and inspect action log files
//!
//! Decodes every record's wire payload and displays the commands.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use park_core::{Action, Tick, decode};
use park_runtime::ActionLogReader;

/// Read and inspect action log files
#[derive(Parser)]
pub struct ReadActions {
    /// Action log written by a session (`[u32 len][bincode entry]` records)
    #[arg(value_name = "LOG")]
    path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,

    /// Limit number of actions to display (0 = unlimited)
    #[arg(short, long, default_value = "100")]
    limit: usize,

    /// Skip first N actions
    #[arg(long, default_value = "0")]
    skip: usize,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Summary view (command kinds and counts)
    Summary,
    /// List all actions
    List,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

/// A log record with its payload decoded.
#[derive(Debug, serde::Serialize)]
struct DecodedEntry {
    tick: Tick,
    action: Action,
}

impl ReadActions {
    pub fn execute(self) -> Result<()> {
        let entries = read_log(&self.path)?;

        println!(
            "{} {}",
            style("Action Log:").bold().cyan(),
            self.path.display()
        );
        println!(
            "{} {}",
            style("Total Actions:").bold().cyan(),
            entries.len()
        );
        println!();

        let entries: Vec<_> = entries
            .into_iter()
            .skip(self.skip)
            .take(if self.limit == 0 {
                usize::MAX
            } else {
                self.limit
            })
            .collect();

        if self.skip > 0 {
            println!("{} {}", style("Skipped:").bold().cyan(), self.skip);
        }
        if self.limit > 0 && entries.len() == self.limit {
            println!("{} {}", style("Showing:").bold().cyan(), entries.len());
            println!();
        }

        match self.format {
            OutputFormat::Summary => print_summary(&entries),
            OutputFormat::List => print_list(&entries),
            OutputFormat::Json => print_json(&entries)?,
            OutputFormat::Debug => print_debug(&entries),
        }

        Ok(())
    }
}

fn read_log(path: &PathBuf) -> Result<Vec<DecodedEntry>> {
    let records = ActionLogReader::read_all(path)
        .with_context(|| format!("Failed to read action log: {}", path.display()))?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let action = decode(&record.payload)
                .with_context(|| format!("Failed to decode record {index} (tick {})", record.tick))?;
            Ok(DecodedEntry {
                tick: record.tick,
                action,
            })
        })
        .collect()
}

fn print_summary(entries: &[DecodedEntry]) {
    println!("{}", style("=== Action Summary ===").bold().green());
    println!();

    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.action.kind().to_string()).or_insert(0usize) += 1;
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    println!("{}", style("Command Distribution:").bold().yellow());
    for (kind, count) in counts {
        println!("  {}: {}", kind, count);
    }
    println!();

    if let (Some(first), Some(last)) = (entries.first(), entries.last()) {
        println!("{}", style("Tick Range:").bold().yellow());
        println!("  First: {}", first.tick);
        println!("  Last: {}", last.tick);
        println!();
    }
}

fn print_list(entries: &[DecodedEntry]) {
    println!("{}", style("=== Action List ===").bold().green());
    println!();

    for entry in entries {
        let network_id = entry
            .action
            .network_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        println!(
            "{} {} {} {}: {:?}",
            style("Tick").bold(),
            entry.tick,
            style("#").dim(),
            network_id,
            entry.action.body()
        );
    }
}

fn print_json(entries: &[DecodedEntry]) -> Result<()> {
    let json =
        serde_json::to_string_pretty(entries).context("Failed to serialize actions to JSON")?;
    println!("{}", json);
    Ok(())
}

fn print_debug(entries: &[DecodedEntry]) {
    for entry in entries {
        println!("{:#?}", entry);
    }
}
