//! Concrete command bodies.
//!
//! Each body supplies only its fields, its validation and its mutation; the
//! shared pipeline lives in [`crate::engine`]. Helpers here cover the checks
//! most construction commands repeat.

mod banner;
mod footpath;
mod land;
mod park;
mod player;
mod ride;
mod track;

pub use banner::{BannerPlace, BannerRemove, BannerSetColour, BannerSetName};
pub use footpath::{FootpathPlace, FootpathRemove};
pub use land::{LandLower, LandRaise, LandRightsSetting, LandSetHeight, LandSetRights};
pub use park::{CheatKind, CheatSet, TogglePause};
pub use player::PlayerSetGroup;
pub use ride::{RideCreate, RideDemolish, RideSetStatus};
pub use track::{TrackPlace, TrackRemove};

use crate::config::EngineConfig;
use crate::env::{ObjectOracle, StringId};
use crate::state::{CoordsXY, Tile, WorldState};

use super::{ActionContext, ActionResult, ActionTransition, Status};

/// Tile at `coords`, refusing anything outside the buildable area.
fn tile_at<T: ActionTransition>(world: &WorldState, coords: CoordsXY) -> Result<&Tile, ActionResult> {
    world
        .map
        .tile_at(coords)
        .ok_or_else(|| T::refuse(Status::InvalidParameters, StringId::OffEdgeOfMap))
}

/// Mutable access to a tile that validation already resolved.
fn tile_at_mut<T: ActionTransition>(
    world: &mut WorldState,
    coords: CoordsXY,
) -> Result<&mut Tile, ActionResult> {
    world
        .map
        .tile_at_mut(coords)
        .ok_or_else(|| ActionResult::internal(T::TITLE, "validated tile vanished before apply"))
}

/// Converts a world elevation into element height units within the buildable band.
fn element_height<T: ActionTransition>(z: i32) -> Result<u8, ActionResult> {
    let height = z.div_euclid(EngineConfig::COORDS_Z_STEP);
    if height < i32::from(EngineConfig::MIN_LAND_HEIGHT) {
        return Err(T::refuse(Status::TooLow, StringId::TooLow));
    }
    u8::try_from(height)
        .ok()
        .filter(|height| *height <= EngineConfig::MAX_ELEMENT_HEIGHT)
        .ok_or_else(|| T::refuse(Status::TooHigh, StringId::TooHigh))
}

/// Land ownership check, lifted by sandbox mode.
fn check_ownership<T: ActionTransition>(
    world: &WorldState,
    tile: &Tile,
    height: u8,
) -> Result<(), ActionResult> {
    if world.cheats.sandbox_mode || tile.permits_building_at(height) {
        Ok(())
    } else {
        Err(T::refuse(Status::NotOwned, StringId::LandNotOwnedByPark))
    }
}

/// Spatial obstruction check, lifted by the clearance cheat.
fn check_clearance<T: ActionTransition>(
    world: &WorldState,
    tile: &Tile,
    height: u8,
) -> Result<(), ActionResult> {
    if world.cheats.disable_clearance_checks {
        return Ok(());
    }
    if tile.is_obstructed(height, EngineConfig::ELEMENT_CLEARANCE) {
        Err(T::refuse(Status::NoClearance, StringId::ObjectInTheWay))
    } else {
        Ok(())
    }
}

/// Whether a removal running under `cx` may touch an element with this ghost flag.
///
/// Ghost calls only ever remove ghost content.
fn removable(cx: &ActionContext<'_>, ghost: bool) -> bool {
    ghost || !cx.is_ghost()
}

fn check_colour<T: ActionTransition>(colour: u8) -> Result<(), ActionResult> {
    if colour < EngineConfig::COLOUR_COUNT {
        Ok(())
    } else {
        Err(T::refuse(Status::InvalidParameters, StringId::InvalidColour))
    }
}

fn objects<'a, T: ActionTransition>(
    cx: &ActionContext<'a>,
) -> Result<&'a (dyn ObjectOracle + 'a), ActionResult> {
    cx.env
        .objects()
        .map_err(|error| ActionResult::from_oracle(T::TITLE, error))
}
