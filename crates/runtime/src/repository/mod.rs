//! Persistence for replay: the append-only action log and world snapshots.
//!
//! Together they let a session be reconstructed: restore a snapshot, then
//! feed the logged entries back through the network queue.

mod error;
mod log;
mod snapshot;

pub use error::{RepositoryError, Result};
pub use log::{ActionLog, ActionLogEntry, ActionLogReader};
pub use snapshot::SnapshotStore;
