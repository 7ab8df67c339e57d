//! Outcome of evaluating or applying an action.

use crate::env::{LocalisationOracle, OracleError, StringId};
use crate::error::{ErrorSeverity, ParkError};
use crate::finance::{ExpenditureType, Money};
use crate::state::{BannerIndex, CoordsXYZ, RideId};

use super::CommandKind;

/// Closed status taxonomy shared by every command kind.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    #[default]
    Ok,
    InvalidParameters,
    /// Policy or permission refusal.
    Disallowed,
    GamePaused,
    InsufficientFunds,
    /// Spatial obstruction.
    NoClearance,
    ItemAlreadyPlaced,
    /// Land or permission ownership check failed.
    NotOwned,
    TooHigh,
    TooLow,
    /// Backing storage exhausted.
    NoFreeElements,
    /// Object must be in its closed operating state first.
    NotClosed,
    /// Unexpected internal failure.
    Unknown,
}

impl ParkError for Status {
    fn severity(&self) -> ErrorSeverity {
        use Status::*;
        match self {
            Ok | GamePaused | InsufficientFunds | NoClearance | ItemAlreadyPlaced | NotClosed
            | NoFreeElements => ErrorSeverity::Recoverable,
            InvalidParameters | Disallowed | NotOwned | TooHigh | TooLow => {
                ErrorSeverity::Validation
            }
            Unknown => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use Status::*;
        match self {
            Ok => "OK",
            InvalidParameters => "ACTION_INVALID_PARAMETERS",
            Disallowed => "ACTION_DISALLOWED",
            GamePaused => "ACTION_GAME_PAUSED",
            InsufficientFunds => "ACTION_INSUFFICIENT_FUNDS",
            NoClearance => "ACTION_NO_CLEARANCE",
            ItemAlreadyPlaced => "ACTION_ITEM_ALREADY_PLACED",
            NotOwned => "ACTION_NOT_OWNED",
            TooHigh => "ACTION_TOO_HIGH",
            TooLow => "ACTION_TOO_LOW",
            NoFreeElements => "ACTION_NO_FREE_ELEMENTS",
            NotClosed => "ACTION_NOT_CLOSED",
            Unknown => "ACTION_UNKNOWN",
        }
    }
}

/// Record of a batch of nested sub-actions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NestedSummary {
    /// Sub-actions that completed successfully.
    pub steps: u16,
    /// Zero-based index of the sub-action that failed, if any.
    pub failed_step: Option<u16>,
    pub failed_kind: Option<CommandKind>,
}

/// Kind-specific result data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResultPayload {
    #[default]
    None,
    /// Index of a newly created banner.
    Banner(BannerIndex),
    /// Id of a newly created ride.
    Ride(RideId),
    Nested(NestedSummary),
}

impl ResultPayload {
    /// Returns true for payloads that only make sense after a successful creation.
    pub const fn is_creation(&self) -> bool {
        matches!(self, Self::Banner(_) | Self::Ride(_))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionResult {
    pub status: Status,
    /// What the player tried to do.
    pub error_title: Option<StringId>,
    /// Why it failed.
    pub error_detail: Option<StringId>,
    /// Signed delta to park funds: negative is an expense, positive a refund.
    pub cost: Money,
    pub expenditure: ExpenditureType,
    pub position: Option<CoordsXYZ>,
    payload: ResultPayload,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self::default()
    }

    /// A refusal. Never carries a creation payload.
    pub fn error(status: Status, title: StringId, detail: StringId) -> Self {
        debug_assert!(status != Status::Ok, "refusal constructed with Ok status");
        Self {
            status,
            error_title: Some(title),
            error_detail: Some(detail),
            ..Self::default()
        }
    }

    /// A programmer error: corrupt tables or an impossible state.
    ///
    /// Aborts in debug builds; degrades to [`Status::Unknown`] otherwise.
    pub fn internal(title: StringId, message: &'static str) -> Self {
        tracing::error!(target: "park::engine", %title, detail = message, "internal action fault");
        debug_assert!(false, "internal action fault: {message}");
        Self::error(Status::Unknown, title, StringId::InternalError)
    }

    /// A required oracle was not wired in, or lacks an entry it must have.
    pub fn from_oracle(title: StringId, error: OracleError) -> Self {
        tracing::error!(
            target: "park::engine",
            %title,
            code = error.error_code(),
            %error,
            "oracle lookup failed"
        );
        Self::error(Status::Unknown, title, StringId::ObjectDataUnavailable)
    }

    #[must_use]
    pub fn with_cost(mut self, cost: Money) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_expenditure(mut self, expenditure: ExpenditureType) -> Self {
        self.expenditure = expenditure;
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: CoordsXYZ) -> Self {
        self.position = Some(position);
        self
    }

    /// Attaches a payload. Creation payloads are dropped on failed results.
    #[must_use]
    pub fn with_payload(mut self, payload: ResultPayload) -> Self {
        if self.is_ok() || !payload.is_creation() {
            self.payload = payload;
        }
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Kind-specific data; creation payloads are only visible on success.
    pub fn payload(&self) -> Option<&ResultPayload> {
        match &self.payload {
            ResultPayload::None => None,
            payload if payload.is_creation() && !self.is_ok() => None,
            payload => Some(payload),
        }
    }

    pub fn banner(&self) -> Option<BannerIndex> {
        match self.payload() {
            Some(ResultPayload::Banner(index)) => Some(*index),
            _ => None,
        }
    }

    pub fn ride(&self) -> Option<RideId> {
        match self.payload() {
            Some(ResultPayload::Ride(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn nested(&self) -> Option<&NestedSummary> {
        match self.payload() {
            Some(ResultPayload::Nested(summary)) => Some(summary),
            _ => None,
        }
    }

    /// Resolves the refusal text, `"title: detail"`, or `None` on success.
    pub fn describe(&self, strings: &dyn LocalisationOracle) -> Option<String> {
        if self.is_ok() {
            return None;
        }
        let title = self.error_title.map(|id| strings.format(id));
        let detail = self.error_detail.map(|id| strings.format(id));
        match (title, detail) {
            (Some(title), Some(detail)) => Some(format!("{title}: {detail}")),
            (Some(text), None) | (None, Some(text)) => Some(text),
            (None, None) => Some(self.status.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::EnglishStrings;

    #[test]
    fn failed_result_hides_creation_payload() {
        let failed = ActionResult::error(
            Status::NoFreeElements,
            StringId::CantPlaceBanner,
            StringId::TooManyBanners,
        )
        .with_payload(ResultPayload::Banner(BannerIndex(3)));

        assert_eq!(failed.payload(), None);
        assert_eq!(failed.banner(), None);

        let placed = ActionResult::ok().with_payload(ResultPayload::Banner(BannerIndex(3)));
        assert_eq!(placed.banner(), Some(BannerIndex(3)));
    }

    #[test]
    fn nested_summary_survives_failure() {
        let summary = NestedSummary {
            steps: 2,
            failed_step: Some(2),
            failed_kind: Some(CommandKind::TrackRemove),
        };
        let failed = ActionResult::error(
            Status::NotClosed,
            StringId::CantDemolishRide,
            StringId::RideMustBeClosed,
        )
        .with_payload(ResultPayload::Nested(summary));

        assert_eq!(failed.nested(), Some(&summary));
    }

    #[test]
    fn describe_joins_title_and_detail() {
        let result = ActionResult::error(
            Status::InvalidParameters,
            StringId::CantPlaceBanner,
            StringId::OffEdgeOfMap,
        );
        assert_eq!(
            result.describe(&EnglishStrings).as_deref(),
            Some("Can't position this here...: Off edge of map")
        );
        assert_eq!(ActionResult::ok().describe(&EnglishStrings), None);
    }

    #[test]
    fn status_severity_classification() {
        assert_eq!(Status::InsufficientFunds.severity(), ErrorSeverity::Recoverable);
        assert_eq!(Status::InvalidParameters.severity(), ErrorSeverity::Validation);
        assert!(Status::Unknown.severity().is_internal());
        assert_eq!(Status::NotClosed.error_code(), "ACTION_NOT_CLOSED");
    }
}
