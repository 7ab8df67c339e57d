//! Session runtime for the park command engine.
//!
//! This crate wires the deterministic engine in `park-core` to the tick
//! thread: a tick-ordered network queue with suspend/resume control, a
//! session that owns the world and schedules local and remote commands, an
//! event bus for observers, and the repositories used for replay.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the single-writer [`Session`]
//! - [`queue`] implements the tick-ordered [`ActionQueue`] and its sender
//! - [`events`] provides the topic-based event bus
//! - [`repository`] and [`replay`] persist and re-run action logs
//! - [`config`] loads [`RuntimeConfig`] from the environment
pub mod config;
pub mod error;
pub mod events;
pub mod queue;
pub mod replay;
pub mod repository;
pub mod session;

pub use config::{NetworkMode, RuntimeConfig};
pub use error::{Result, RuntimeError};
pub use events::{EventBus, SessionEvent, Topic};
pub use queue::{
    ActionQueue, AppliedEntry, Completion, DiscardedEntry, ProcessReport, QueueSender,
    QueuedAction,
};
pub use replay::{ReplayOutcome, replay};
pub use repository::{ActionLog, ActionLogEntry, ActionLogReader, RepositoryError, SnapshotStore};
pub use session::{Packet, Session};
