use crate::action::{
    ActionContext, ActionResult, ActionTransition, CommandKind, ParameterVisitor, ResultPayload,
    Status, Validated,
};
use crate::config::EngineConfig;
use crate::engine::NestedBatch;
use crate::env::StringId;
use crate::finance::ExpenditureType;
use crate::state::{
    CoordsXY, CoordsXYZD, Permissions, Ride, RideId, RideStatus, RideType, TileElement,
    WorldState,
};

use super::{TrackRemove, check_colour, objects};

/// Registers a new, closed ride with no track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RideCreate {
    pub ride_type: u8,
    pub colour: u8,
}

impl ActionTransition for RideCreate {
    type Plan = (RideId, RideType);

    const KIND: CommandKind = CommandKind::RideCreate;
    const TITLE: StringId = StringId::CantCreateRide;

    fn required_permission() -> Permissions {
        Permissions::RIDE_CONSTRUCTION
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_u8("ride_type", &mut self.ride_type);
        visitor.visit_u8("colour", &mut self.colour);
    }

    fn pre_validate(
        &self,
        cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<(RideId, RideType)>, ActionResult> {
        let invalid_type = || Self::refuse(Status::InvalidParameters, StringId::InvalidRideType);
        let ride_type = RideType::from_repr(self.ride_type).ok_or_else(invalid_type)?;
        if objects::<Self>(cx)?.ride(ride_type).is_none() {
            return Err(invalid_type());
        }
        check_colour::<Self>(self.colour)?;

        let id = world
            .rides
            .next_free()
            .ok_or_else(|| Self::refuse(Status::NoFreeElements, StringId::TooManyRides))?;

        let result = ActionResult::ok().with_expenditure(ExpenditureType::RideConstruction);
        Ok(Validated::new(result, (id, ride_type)))
    }

    fn apply(
        &self,
        validated: Validated<(RideId, RideType)>,
        _cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        let (id, ride_type) = validated.plan;
        world.rides.insert(id, Ride::new(ride_type, self.colour));
        tracing::debug!(target: "park::engine", ride = id.0, %ride_type, "ride created");
        validated.result.with_payload(ResultPayload::Ride(id))
    }
}

/// Opens, closes or tests a ride.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RideSetStatus {
    pub ride: RideId,
    pub status: u8,
}

impl ActionTransition for RideSetStatus {
    type Plan = RideStatus;

    const KIND: CommandKind = CommandKind::RideSetStatus;
    const TITLE: StringId = StringId::CantChangeRideStatus;

    fn required_permission() -> Permissions {
        Permissions::RIDE_PROPERTIES
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_u16("ride", &mut self.ride.0);
        visitor.visit_u8("status", &mut self.status);
    }

    fn pre_validate(
        &self,
        _cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<RideStatus>, ActionResult> {
        let status = RideStatus::from_repr(self.status)
            .ok_or_else(|| Self::refuse(Status::InvalidParameters, StringId::ValueOutOfRange))?;
        if world.rides.get(self.ride).is_none() {
            return Err(Self::refuse(
                Status::InvalidParameters,
                StringId::RideNotFound,
            ));
        }
        Ok(Validated::new(ActionResult::ok(), status))
    }

    fn apply(
        &self,
        validated: Validated<RideStatus>,
        _cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        match world.rides.get_mut(self.ride) {
            Some(ride) => ride.status = validated.plan,
            None => return ActionResult::internal(Self::TITLE, "validated ride vanished"),
        }
        validated.result
    }
}

/// Removes a closed ride along with every piece of its track.
///
/// Each piece goes through [`TrackRemove`] as a nested step, so the refund is
/// the sum of the per-piece refunds and any refused piece aborts the whole
/// demolition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RideDemolish {
    pub ride: RideId,
}

impl RideDemolish {
    /// Removal steps for every track piece of the ride, in row order.
    fn removals(&self, world: &WorldState) -> Vec<TrackRemove> {
        world
            .map
            .iter()
            .flat_map(|(tile, contents)| {
                let corner = CoordsXY::from_tile(tile);
                contents.elements.iter().filter_map(move |element| match *element {
                    TileElement::Track {
                        ride,
                        track_type,
                        height,
                        direction,
                        ..
                    } if ride == self.ride => Some(TrackRemove {
                        ride,
                        loc: CoordsXYZD::new(
                            corner.x,
                            corner.y,
                            i32::from(height) * EngineConfig::COORDS_Z_STEP,
                            direction,
                        ),
                        track_type,
                    }),
                    _ => None,
                })
            })
            .collect()
    }
}

impl ActionTransition for RideDemolish {
    type Plan = Vec<TrackRemove>;

    const KIND: CommandKind = CommandKind::RideDemolish;
    const TITLE: StringId = StringId::CantDemolishRide;

    fn required_permission() -> Permissions {
        Permissions::DEMOLISH_RIDE
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_u16("ride", &mut self.ride.0);
    }

    fn pre_validate(
        &self,
        cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<Vec<TrackRemove>>, ActionResult> {
        let ride = world
            .rides
            .get(self.ride)
            .ok_or_else(|| Self::refuse(Status::InvalidParameters, StringId::RideNotFound))?;
        if !ride.is_closed() {
            return Err(Self::refuse(Status::NotClosed, StringId::RideMustBeClosed));
        }

        let removals = self.removals(world);
        let batch = NestedBatch::new(Self::TITLE).query_all(cx, world, &removals)?;
        let result = batch
            .finish()
            .with_expenditure(ExpenditureType::RideConstruction);
        Ok(Validated::new(result, removals))
    }

    fn apply(
        &self,
        validated: Validated<Vec<TrackRemove>>,
        cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        let batch = match NestedBatch::new(Self::TITLE).execute_all(cx, world, &validated.plan) {
            Ok(batch) => batch,
            Err(failure) => return failure,
        };
        if world.rides.remove(self.ride).is_none() {
            return ActionResult::internal(Self::TITLE, "validated ride vanished");
        }
        tracing::debug!(
            target: "park::engine",
            ride = self.ride.0,
            pieces = batch.steps(),
            refund = batch.cost(),
            "ride demolished"
        );
        batch
            .finish()
            .with_expenditure(ExpenditureType::RideConstruction)
    }
}
