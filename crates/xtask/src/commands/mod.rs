//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod read_actions;
mod read_state;
mod replay;

pub use read_actions::ReadActions;
pub use read_state::ReadState;
pub use replay::Replay;
