use crate::action::{
    ActionContext, ActionResult, ActionTransition, CommandKind, ParameterVisitor, Status,
    Validated,
};
use crate::config::EngineConfig;
use crate::env::{OracleError, RideEntry, StringId};
use crate::finance::{ExpenditureType, Money};
use crate::state::{
    CoordsXYZD, Permissions, Ride, RideId, TileElement, WorldState, direction_valid,
};

use super::{
    check_clearance, check_ownership, element_height, objects, removable, tile_at, tile_at_mut,
};

/// Looks up a ride that must exist and be closed for construction.
fn closed_ride<T: ActionTransition>(world: &WorldState, id: RideId) -> Result<&Ride, ActionResult> {
    let ride = world
        .rides
        .get(id)
        .ok_or_else(|| T::refuse(Status::InvalidParameters, StringId::RideNotFound))?;
    if !ride.is_closed() {
        return Err(T::refuse(Status::NotClosed, StringId::RideMustBeClosed));
    }
    Ok(ride)
}

fn ride_entry<T: ActionTransition>(
    cx: &ActionContext<'_>,
    ride: &Ride,
) -> Result<RideEntry, ActionResult> {
    objects::<T>(cx)?.ride(ride.ride_type).ok_or_else(|| {
        ActionResult::from_oracle(T::TITLE, OracleError::RideTypeNotFound(ride.ride_type))
    })
}

/// Places one piece of track for a closed ride.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackPlace {
    pub ride: RideId,
    pub loc: CoordsXYZD,
    pub track_type: u8,
}

impl ActionTransition for TrackPlace {
    /// Height of the new piece.
    type Plan = u8;

    const KIND: CommandKind = CommandKind::TrackPlace;
    const TITLE: StringId = StringId::CantBuildTrack;

    fn required_permission() -> Permissions {
        Permissions::RIDE_CONSTRUCTION
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_u16("ride", &mut self.ride.0);
        visitor.visit_coords_xyzd(&mut self.loc);
        visitor.visit_u8("track_type", &mut self.track_type);
    }

    fn pre_validate(
        &self,
        cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<u8>, ActionResult> {
        let ride = closed_ride::<Self>(world, self.ride)?;
        let tile = tile_at::<Self>(world, self.loc.xy())?;
        if !direction_valid(self.loc.direction) {
            return Err(Self::refuse(
                Status::InvalidParameters,
                StringId::InvalidDirection,
            ));
        }

        let entry = ride_entry::<Self>(cx, ride)?;
        if self.track_type >= entry.track_types {
            return Err(Self::refuse(
                Status::InvalidParameters,
                StringId::InvalidTrackPiece,
            ));
        }

        let height = element_height::<Self>(self.loc.z)?;
        if height < tile.surface.height {
            return Err(Self::refuse(Status::TooLow, StringId::TooLow));
        }
        if height > tile.surface.height.saturating_add(entry.max_height_above_ground) {
            return Err(Self::refuse(Status::TooHigh, StringId::TooHigh));
        }
        check_ownership::<Self>(world, tile, height)?;

        let path_in_the_way = tile.path.is_some_and(|path| {
            !path.ghost
                && path.height < height.saturating_add(EngineConfig::ELEMENT_CLEARANCE)
                && height < path.height.saturating_add(EngineConfig::ELEMENT_CLEARANCE)
        });
        if path_in_the_way && !world.cheats.disable_clearance_checks {
            return Err(Self::refuse(Status::NoClearance, StringId::ObjectInTheWay));
        }
        check_clearance::<Self>(world, tile, height)?;
        if tile.elements.is_full() {
            return Err(Self::refuse(
                Status::NoFreeElements,
                StringId::TileElementLimitReached,
            ));
        }

        let result = ActionResult::ok()
            .with_cost(-entry.piece_price)
            .with_expenditure(ExpenditureType::RideConstruction)
            .with_position(self.loc.xyz());
        Ok(Validated::new(result, height))
    }

    fn apply(
        &self,
        validated: Validated<u8>,
        cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        let pushed = match tile_at_mut::<Self>(world, self.loc.xy()) {
            Ok(tile) => tile.push_element(TileElement::Track {
                ride: self.ride,
                track_type: self.track_type,
                height: validated.plan,
                direction: self.loc.direction,
                ghost: cx.is_ghost(),
            }),
            Err(fault) => return fault,
        };
        if !pushed {
            return ActionResult::internal(Self::TITLE, "validated element slot unavailable");
        }
        world.invalidate(self.loc.xy());
        validated.result
    }
}

/// Removes one piece of a closed ride's track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackRemove {
    pub ride: RideId,
    pub loc: CoordsXYZD,
    pub track_type: u8,
}

impl ActionTransition for TrackRemove {
    /// Slot of the piece in the tile's element list.
    type Plan = usize;

    const KIND: CommandKind = CommandKind::TrackRemove;
    const TITLE: StringId = StringId::CantRemoveTrack;

    fn required_permission() -> Permissions {
        Permissions::RIDE_CONSTRUCTION
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_u16("ride", &mut self.ride.0);
        visitor.visit_coords_xyzd(&mut self.loc);
        visitor.visit_u8("track_type", &mut self.track_type);
    }

    fn pre_validate(
        &self,
        cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<usize>, ActionResult> {
        let ride = closed_ride::<Self>(world, self.ride)?;
        let tile = tile_at::<Self>(world, self.loc.xy())?;
        let height = element_height::<Self>(self.loc.z)?;

        let (slot, ghost) = tile
            .elements
            .iter()
            .enumerate()
            .find_map(|(slot, element)| match element {
                TileElement::Track {
                    ride,
                    track_type,
                    height: h,
                    direction,
                    ghost,
                } if *ride == self.ride
                    && *track_type == self.track_type
                    && *h == height
                    && *direction == self.loc.direction
                    && removable(cx, *ghost) =>
                {
                    Some((slot, *ghost))
                }
                _ => None,
            })
            .ok_or_else(|| Self::refuse(Status::InvalidParameters, StringId::TrackNotFound))?;
        check_ownership::<Self>(world, tile, height)?;

        let refund: Money = if ghost {
            0
        } else {
            EngineConfig::refund_of(ride_entry::<Self>(cx, ride)?.piece_price)
        };
        let result = ActionResult::ok()
            .with_cost(refund)
            .with_expenditure(ExpenditureType::RideConstruction)
            .with_position(self.loc.xyz());
        Ok(Validated::new(result, slot))
    }

    fn apply(
        &self,
        validated: Validated<usize>,
        _cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        let removed = match tile_at_mut::<Self>(world, self.loc.xy()) {
            Ok(tile) => tile.elements.pop_at(validated.plan),
            Err(fault) => return fault,
        };
        if removed.is_none() {
            return ActionResult::internal(Self::TITLE, "validated track piece vanished");
        }
        world.invalidate(self.loc.xy());
        validated.result
    }
}
