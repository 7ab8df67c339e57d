//! Deterministic park command engine shared by every session participant.
//!
//! `park-core` defines the command abstraction (actions, results, the wire
//! codec), the authoritative park state and the dispatcher that validates and
//! applies commands against it. All state mutation flows through
//! [`engine::ParkEngine`]; the runtime and offline tools depend on the types
//! re-exported here.
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod finance;
pub mod state;

pub use action::{
    Action, ActionBody, ActionContext, ActionFlags, ActionRegistry, ActionResult,
    ActionTransition, BannerPlace, BannerRemove, BannerSetColour, BannerSetName, CheatKind,
    CheatSet, CodecError, CommandFlags, CommandKind, FootpathPlace, FootpathRemove, LandLower,
    LandRaise, LandRightsSetting, LandSetHeight, LandSetRights, NestedSummary, ParameterValue,
    ParameterVisitor, PlayerSetGroup, RegistryError, ResultPayload, RideCreate, RideDemolish,
    RideSetStatus, SessionMode, Status, TogglePause, TrackPlace, TrackRemove, decode, encode,
};
pub use config::EngineConfig;
pub use engine::{NestedBatch, ParkEngine, TransitionPhase, query};
pub use env::{
    BannerEntry, EnglishStrings, Env, LocalisationOracle, ObjectOracle, OracleError, ParkEnv,
    RideEntry, StaticObjects, StringId,
};
pub use error::{ErrorSeverity, ParkError};
pub use finance::{ExpenditureType, Finance, Money, ParkFinance};
pub use state::{
    BannerIndex, CoordsXY, CoordsXYZ, CoordsXYZD, MapRange, NetworkId, OwnershipFlags,
    Permissions, PlayerId, RideId, RideStatus, RideType, Tick, WorldState,
};
