//! Unified error type surfaced by the session API.
//!
//! Expected command refusals travel as [`park_core::ActionResult`] values;
//! these are the transport, storage and configuration faults around them.
use thiserror::Error;

use park_core::{CodecError, ErrorSeverity, ParkError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to decode or encode an action")]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("queue inbox channel closed")]
    InboxClosed,

    #[error("invalid value {value:?} for {key}")]
    InvalidConfig { key: &'static str, value: String },
}

impl ParkError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Codec(error) => error.severity(),
            RuntimeError::Repository(_) | RuntimeError::InboxClosed => ErrorSeverity::Recoverable,
            RuntimeError::InvalidConfig { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::Codec(error) => error.error_code(),
            RuntimeError::Repository(_) => "RUNTIME_REPOSITORY",
            RuntimeError::InboxClosed => "RUNTIME_INBOX_CLOSED",
            RuntimeError::InvalidConfig { .. } => "RUNTIME_INVALID_CONFIG",
        }
    }
}
