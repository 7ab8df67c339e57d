use strum::EnumMessage;

/// Identifier of a user-facing message.
///
/// Results never carry raw text; titles and details are resolved through a
/// [`LocalisationOracle`] at the UI boundary.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumMessage,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StringId {
    // ===== titles =====
    #[strum(message = "Can't do this...")]
    CantDoThis,
    #[strum(message = "Can't pause game...")]
    CantPauseGame,
    #[strum(message = "Can't apply cheat...")]
    CantSetCheat,
    #[strum(message = "Can't change land ownership...")]
    CantSetLandRights,
    #[strum(message = "Can't change land height here...")]
    CantChangeLandHeight,
    #[strum(message = "Can't raise land here...")]
    CantRaiseLand,
    #[strum(message = "Can't lower land here...")]
    CantLowerLand,
    #[strum(message = "Can't build footpath here...")]
    CantBuildFootpath,
    #[strum(message = "Can't remove footpath from here...")]
    CantRemoveFootpath,
    #[strum(message = "Can't position this here...")]
    CantPlaceBanner,
    #[strum(message = "Can't remove this...")]
    CantRemoveBanner,
    #[strum(message = "Can't repaint this...")]
    CantRepaintBanner,
    #[strum(message = "Can't rename banner...")]
    CantRenameBanner,
    #[strum(message = "Can't create new ride...")]
    CantCreateRide,
    #[strum(message = "Can't change ride status...")]
    CantChangeRideStatus,
    #[strum(message = "Can't construct this here...")]
    CantBuildTrack,
    #[strum(message = "Can't remove track piece...")]
    CantRemoveTrack,
    #[strum(message = "Can't demolish ride...")]
    CantDemolishRide,
    #[strum(message = "Can't change group...")]
    CantChangePlayerGroup,

    // ===== details =====
    #[strum(message = "Off edge of map")]
    OffEdgeOfMap,
    #[strum(message = "Land not owned by park")]
    LandNotOwnedByPark,
    #[strum(message = "Not enough cash")]
    NotEnoughCash,
    #[strum(message = "Construction is not possible while game is paused")]
    ConstructionNotPossibleWhilePaused,
    #[strum(message = "Only available in the scenario editor")]
    EditorOnly,
    #[strum(message = "You do not have permission to do this")]
    PermissionDenied,
    #[strum(message = "This can't be done over the network")]
    NotAllowedOverNetwork,
    #[strum(message = "Invalid colour")]
    InvalidColour,
    #[strum(message = "Invalid direction")]
    InvalidDirection,
    #[strum(message = "Invalid value")]
    ValueOutOfRange,
    #[strum(message = "Unknown banner type")]
    InvalidBannerType,
    #[strum(message = "Banner not found")]
    BannerNotFound,
    #[strum(message = "Banners must be placed on a footpath")]
    BannerMustBeOnPath,
    #[strum(message = "A banner is already placed here")]
    BannerAlreadyPlaced,
    #[strum(message = "Too many banners in game")]
    TooManyBanners,
    #[strum(message = "Name is too long")]
    NameTooLong,
    #[strum(message = "Ride not found")]
    RideNotFound,
    #[strum(message = "Too many rides")]
    TooManyRides,
    #[strum(message = "Unknown ride type")]
    InvalidRideType,
    #[strum(message = "Ride must be closed first")]
    RideMustBeClosed,
    #[strum(message = "Invalid track piece")]
    InvalidTrackPiece,
    #[strum(message = "Track piece not found")]
    TrackNotFound,
    #[strum(message = "Too high!")]
    TooHigh,
    #[strum(message = "Too low!")]
    TooLow,
    #[strum(message = "Object in the way")]
    ObjectInTheWay,
    #[strum(message = "Footpath already here")]
    PathAlreadyHere,
    #[strum(message = "No footpath here")]
    NoFootpathHere,
    #[strum(message = "Tile element limit reached")]
    TileElementLimitReached,
    #[strum(message = "Player not found")]
    PlayerNotFound,
    #[strum(message = "Group not found")]
    GroupNotFound,
    #[strum(message = "Can't change the group that the host belongs to")]
    CantChangeHostGroup,
    #[strum(message = "Can't set to this group")]
    CantSetToThisGroup,
    #[strum(message = "Unknown cheat")]
    InvalidCheat,
    #[strum(message = "Object data is unavailable")]
    ObjectDataUnavailable,
    #[strum(message = "Internal error")]
    InternalError,
}

/// Localisation oracle: resolves message identifiers to display text.
pub trait LocalisationOracle: Send + Sync {
    fn format(&self, id: StringId) -> String;
}

/// Built-in English strings.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnglishStrings;

impl LocalisationOracle for EnglishStrings {
    fn format(&self, id: StringId) -> String {
        id.get_message()
            .map(str::to_owned)
            .unwrap_or_else(|| id.to_string())
    }
}
