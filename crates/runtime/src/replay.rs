//! Deterministic replay of an action log.

use park_core::{ActionResult, WorldState};

use crate::config::{NetworkMode, RuntimeConfig};
use crate::error::Result;
use crate::repository::ActionLogEntry;
use crate::session::Session;

/// Final state and ordered results of a replay.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub world: WorldState,
    pub results: Vec<ActionResult>,
}

impl ReplayOutcome {
    /// Hex SHA-256 state root of the final world.
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.world.state_root())
    }
}

/// Feeds `entries` through a fresh session started from `snapshot`.
///
/// Every entry is queued at its logged tick before processing starts, so the
/// application order is the log's `(tick, position)` order regardless of
/// stale-entry settings.
///
/// # Errors
///
/// Fails on the first entry whose payload does not decode.
pub fn replay(
    snapshot: WorldState,
    entries: &[ActionLogEntry],
    config: RuntimeConfig,
) -> Result<ReplayOutcome> {
    let config = RuntimeConfig {
        network_mode: NetworkMode::None,
        ..config
    };
    let mut session = Session::new(snapshot, config);
    for entry in entries {
        session.receive(entry.tick, &entry.payload)?;
    }

    let results = session
        .run_until_idle()
        .into_iter()
        .flat_map(|report| report.applied)
        .map(|applied| applied.result)
        .collect();

    tracing::info!(
        target: "park::session",
        entries = entries.len(),
        tick = %session.current_tick(),
        "replay finished"
    );
    Ok(ReplayOutcome {
        world: session.snapshot(),
        results,
    })
}
