use crate::action::{
    ActionContext, ActionResult, ActionTransition, CommandKind, ParameterVisitor, Status,
    Validated,
};
use crate::config::EngineConfig;
use crate::env::StringId;
use crate::finance::ExpenditureType;
use crate::state::{CoordsXYZ, PathElement, Permissions, TileElement, WorldState};

use super::{check_clearance, check_ownership, element_height, removable, tile_at, tile_at_mut};

/// Lays a footpath segment on one tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FootpathPlace {
    pub loc: CoordsXYZ,
}

impl ActionTransition for FootpathPlace {
    /// Height of the new segment.
    type Plan = u8;

    const KIND: CommandKind = CommandKind::FootpathPlace;
    const TITLE: StringId = StringId::CantBuildFootpath;

    fn required_permission() -> Permissions {
        Permissions::BUILD_PATH
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_coords_xyz(&mut self.loc);
    }

    fn pre_validate(
        &self,
        _cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<u8>, ActionResult> {
        let tile = tile_at::<Self>(world, self.loc.xy())?;
        let height = element_height::<Self>(self.loc.z)?;

        if height < tile.surface.height {
            return Err(Self::refuse(Status::TooLow, StringId::TooLow));
        }
        if tile.path.is_some() {
            return Err(Self::refuse(
                Status::ItemAlreadyPlaced,
                StringId::PathAlreadyHere,
            ));
        }
        check_ownership::<Self>(world, tile, height)?;
        check_clearance::<Self>(world, tile, height)?;

        let result = ActionResult::ok()
            .with_cost(-EngineConfig::FOOTPATH_PRICE)
            .with_expenditure(ExpenditureType::Landscaping)
            .with_position(self.loc);
        Ok(Validated::new(result, height))
    }

    fn apply(
        &self,
        validated: Validated<u8>,
        cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        match tile_at_mut::<Self>(world, self.loc.xy()) {
            Ok(tile) => {
                tile.path = Some(PathElement {
                    height: validated.plan,
                    ghost: cx.is_ghost(),
                });
            }
            Err(fault) => return fault,
        }
        world.invalidate(self.loc.xy());
        validated.result
    }
}

/// Removes the footpath segment at an exact height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FootpathRemove {
    pub loc: CoordsXYZ,
}

impl ActionTransition for FootpathRemove {
    type Plan = ();

    const KIND: CommandKind = CommandKind::FootpathRemove;
    const TITLE: StringId = StringId::CantRemoveFootpath;

    fn required_permission() -> Permissions {
        Permissions::BUILD_PATH
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_coords_xyz(&mut self.loc);
    }

    fn pre_validate(
        &self,
        cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<()>, ActionResult> {
        let tile = tile_at::<Self>(world, self.loc.xy())?;
        let height = element_height::<Self>(self.loc.z)?;

        let path = tile
            .path
            .filter(|path| path.height == height && removable(cx, path.ghost))
            .ok_or_else(|| Self::refuse(Status::InvalidParameters, StringId::NoFootpathHere))?;
        check_ownership::<Self>(world, tile, height)?;

        // Banners stand on the path edge and have to go first.
        let carries_banner = tile
            .elements
            .iter()
            .any(|element| matches!(element, TileElement::Banner { ghost: false, .. }));
        if carries_banner && !world.cheats.disable_clearance_checks {
            return Err(Self::refuse(Status::NoClearance, StringId::ObjectInTheWay));
        }

        let refund = if path.ghost {
            0
        } else {
            EngineConfig::FOOTPATH_REFUND
        };
        let result = ActionResult::ok()
            .with_cost(refund)
            .with_expenditure(ExpenditureType::Landscaping)
            .with_position(self.loc);
        Ok(Validated::preview(result))
    }

    fn apply(
        &self,
        validated: Validated<()>,
        _cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        match tile_at_mut::<Self>(world, self.loc.xy()) {
            Ok(tile) => tile.path = None,
            Err(fault) => return fault,
        }
        world.invalidate(self.loc.xy());
        validated.result
    }
}
