//! Oracle access errors.

use crate::error::{ErrorSeverity, ParkError};
use crate::state::RideType;

/// Errors that occur when accessing oracle data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("ObjectOracle not available")]
    ObjectsNotAvailable,

    #[error("LocalisationOracle not available")]
    StringsNotAvailable,

    #[error("banner type {0} not found")]
    BannerTypeNotFound(u8),

    #[error("ride type {0} not found")]
    RideTypeNotFound(RideType),
}

impl ParkError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            ObjectsNotAvailable | StringsNotAvailable => ErrorSeverity::Fatal,
            BannerTypeNotFound(_) | RideTypeNotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            ObjectsNotAvailable => "ORACLE_OBJECTS_NOT_AVAILABLE",
            StringsNotAvailable => "ORACLE_STRINGS_NOT_AVAILABLE",
            BannerTypeNotFound(_) => "ORACLE_BANNER_TYPE_NOT_FOUND",
            RideTypeNotFound(_) => "ORACLE_RIDE_TYPE_NOT_FOUND",
        }
    }
}
