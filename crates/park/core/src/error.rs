//! Common error infrastructure for park-core.
//!
//! Expected refusals are not Rust errors: they travel as [`crate::ActionResult`]
//! values carrying a [`crate::Status`]. The types here classify both those
//! statuses and the real fault enums (`CodecError`, `RegistryError`,
//! `OracleError`) so callers can log and react to them uniformly.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: may succeed later without changing the request
/// - **Validation**: invalid input, should not be retried unchanged
/// - **Internal**: unexpected state inconsistency, indicates a bug
/// - **Fatal**: the engine cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: insufficient funds, game paused, obstruction.
    Recoverable,

    /// Examples: off-map coordinates, colour outside the palette.
    Validation,

    /// Examples: corrupt object tables, missing oracle data.
    Internal,

    /// Examples: undecodable wire data from a trusted peer.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all park-core errors and statuses.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error on fault enums
/// - Classify severity based on recoverability, not impact
/// - Error codes are stable and upper snake case
pub trait ParkError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
