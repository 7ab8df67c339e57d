//! Terrain commands: land rights and surface height.
//!
//! Range operations never edit tiles directly. They resolve which tiles move
//! and issue one nested [`LandSetHeight`] per tile, so each tile gets the
//! full single-tile validation and the parent's cost is the sum of its steps.

use crate::action::{
    ActionContext, ActionFlags, ActionResult, ActionTransition, CommandKind, ParameterVisitor,
    Status, Validated,
};
use crate::config::EngineConfig;
use crate::engine::NestedBatch;
use crate::env::StringId;
use crate::finance::{ExpenditureType, Money};
use crate::state::{CoordsXY, CoordsXYZ, MapRange, OwnershipFlags, Permissions, WorldState};

use super::{tile_at, tile_at_mut};

/// Ownership state written by [`LandSetRights`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum LandRightsSetting {
    Unowned = 0,
    Owned = 1,
    ConstructionRights = 2,
    Available = 3,
}

impl LandRightsSetting {
    fn ownership(self) -> OwnershipFlags {
        match self {
            LandRightsSetting::Unowned => OwnershipFlags::empty(),
            LandRightsSetting::Owned => OwnershipFlags::OWNED,
            LandRightsSetting::ConstructionRights => OwnershipFlags::CONSTRUCTION_RIGHTS,
            LandRightsSetting::Available => OwnershipFlags::AVAILABLE,
        }
    }
}

/// Scenario-editor command assigning ownership over a range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LandSetRights {
    pub range: MapRange,
    pub setting: u8,
}

impl ActionTransition for LandSetRights {
    type Plan = (MapRange, OwnershipFlags);

    const KIND: CommandKind = CommandKind::LandSetRights;
    const TITLE: StringId = StringId::CantSetLandRights;

    fn action_flags() -> ActionFlags {
        ActionFlags::EDITOR_ONLY
    }

    fn required_permission() -> Permissions {
        Permissions::EDIT_SCENARIO
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_map_range(&mut self.range);
        visitor.visit_u8("setting", &mut self.setting);
    }

    fn pre_validate(
        &self,
        _cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<Self::Plan>, ActionResult> {
        let setting = LandRightsSetting::from_repr(self.setting)
            .ok_or_else(|| Self::refuse(Status::InvalidParameters, StringId::ValueOutOfRange))?;
        let range = buildable_range(world, self.range);
        let centre = range.centre();
        let height = world
            .map
            .tile_at(centre)
            .map_or(EngineConfig::DEFAULT_LAND_HEIGHT, |tile| tile.surface.height);

        let result = ActionResult::ok()
            .with_expenditure(ExpenditureType::LandPurchase)
            .with_position(surface_position(centre, height));
        Ok(Validated::new(result, (range, setting.ownership())))
    }

    fn apply(
        &self,
        validated: Validated<Self::Plan>,
        _cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        let (range, ownership) = validated.plan;
        for tile in range.tiles() {
            if let Some(slot) = world.map.tile_mut(tile) {
                slot.ownership = ownership;
            }
            world.invalidate(CoordsXY::from_tile(tile));
        }
        validated.result
    }
}

/// Sets the surface of one tile to an absolute height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LandSetHeight {
    pub loc: CoordsXY,
    pub height: u8,
}

impl ActionTransition for LandSetHeight {
    type Plan = ();

    const KIND: CommandKind = CommandKind::LandSetHeight;
    const TITLE: StringId = StringId::CantChangeLandHeight;

    fn required_permission() -> Permissions {
        Permissions::TERRAFORM
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_coords_xy(&mut self.loc);
        visitor.visit_u8("height", &mut self.height);
    }

    fn pre_validate(
        &self,
        _cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<()>, ActionResult> {
        let tile = tile_at::<Self>(world, self.loc)?;

        if self.height < EngineConfig::MIN_LAND_HEIGHT {
            return Err(Self::refuse(Status::TooLow, StringId::TooLow));
        }
        if self.height > EngineConfig::MAX_LAND_HEIGHT {
            return Err(Self::refuse(Status::TooHigh, StringId::TooHigh));
        }

        if !world.cheats.sandbox_mode && !tile.ownership.contains(OwnershipFlags::OWNED) {
            return Err(Self::refuse(Status::NotOwned, StringId::LandNotOwnedByPark));
        }

        // Raised land must not swallow anything built on the tile.
        if !world.cheats.disable_clearance_checks {
            let buried_path = tile
                .path
                .is_some_and(|path| !path.ghost && path.height < self.height);
            let buried_element = tile
                .elements
                .iter()
                .any(|element| !element.is_ghost() && element.height() < self.height);
            if buried_path || buried_element {
                return Err(Self::refuse(Status::NoClearance, StringId::ObjectInTheWay));
            }
        }

        let steps = Money::from(self.height.abs_diff(tile.surface.height));
        let result = ActionResult::ok()
            .with_cost(-steps * EngineConfig::LAND_HEIGHT_STEP_PRICE)
            .with_expenditure(ExpenditureType::Landscaping)
            .with_position(surface_position(self.loc.to_tile_centre(), self.height));
        Ok(Validated::preview(result))
    }

    fn apply(
        &self,
        validated: Validated<()>,
        _cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        match tile_at_mut::<Self>(world, self.loc) {
            Ok(tile) => tile.surface.height = self.height,
            Err(fault) => return fault,
        }
        world.invalidate(self.loc);
        validated.result
    }
}

/// Raises the lowest tiles of a range by one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LandRaise {
    pub centre: CoordsXY,
    pub range: MapRange,
}

impl ActionTransition for LandRaise {
    type Plan = Vec<LandSetHeight>;

    const KIND: CommandKind = CommandKind::LandRaise;
    const TITLE: StringId = StringId::CantRaiseLand;

    fn required_permission() -> Permissions {
        Permissions::TERRAFORM
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_coords_xy(&mut self.centre);
        visitor.visit_map_range(&mut self.range);
    }

    fn pre_validate(
        &self,
        cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<Self::Plan>, ActionResult> {
        let steps = level_steps::<Self>(world, self.range, Level::Lowest)?;
        preview_steps::<Self>(cx, world, self.centre, steps)
    }

    fn apply(
        &self,
        validated: Validated<Self::Plan>,
        cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        apply_steps::<Self>(cx, world, validated)
    }
}

/// Lowers the highest tiles of a range by one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LandLower {
    pub centre: CoordsXY,
    pub range: MapRange,
}

impl ActionTransition for LandLower {
    type Plan = Vec<LandSetHeight>;

    const KIND: CommandKind = CommandKind::LandLower;
    const TITLE: StringId = StringId::CantLowerLand;

    fn required_permission() -> Permissions {
        Permissions::TERRAFORM
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_coords_xy(&mut self.centre);
        visitor.visit_map_range(&mut self.range);
    }

    fn pre_validate(
        &self,
        cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<Self::Plan>, ActionResult> {
        let steps = level_steps::<Self>(world, self.range, Level::Highest)?;
        preview_steps::<Self>(cx, world, self.centre, steps)
    }

    fn apply(
        &self,
        validated: Validated<Self::Plan>,
        cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        apply_steps::<Self>(cx, world, validated)
    }
}

#[derive(Clone, Copy)]
enum Level {
    Lowest,
    Highest,
}

fn buildable_range(world: &WorldState, range: MapRange) -> MapRange {
    range.clamp(EngineConfig::COORDS_XY_STEP, world.map.max_coord())
}

fn surface_position(coords: CoordsXY, height: u8) -> CoordsXYZ {
    CoordsXYZ::new(
        coords.x,
        coords.y,
        i32::from(height) * EngineConfig::COORDS_Z_STEP,
    )
}

/// One nested height change for every tile at the extreme height of the range.
fn level_steps<T: ActionTransition>(
    world: &WorldState,
    range: MapRange,
    level: Level,
) -> Result<Vec<LandSetHeight>, ActionResult> {
    let tiles: Vec<_> = buildable_range(world, range)
        .tiles()
        .filter_map(|coords| world.map.tile(coords).map(|tile| (coords, tile.surface.height)))
        .collect();

    let heights = tiles.iter().map(|(_, height)| *height);
    let (extreme, target) = match level {
        Level::Lowest => {
            let lowest = heights.min().unwrap_or(EngineConfig::DEFAULT_LAND_HEIGHT);
            if lowest >= EngineConfig::MAX_LAND_HEIGHT {
                return Err(T::refuse(Status::TooHigh, StringId::TooHigh));
            }
            (lowest, lowest + 1)
        }
        Level::Highest => {
            let highest = heights.max().unwrap_or(EngineConfig::DEFAULT_LAND_HEIGHT);
            if highest <= EngineConfig::MIN_LAND_HEIGHT {
                return Err(T::refuse(Status::TooLow, StringId::TooLow));
            }
            (highest, highest - 1)
        }
    };

    Ok(tiles
        .into_iter()
        .filter(|(_, height)| *height == extreme)
        .map(|(coords, _)| LandSetHeight {
            loc: CoordsXY::from_tile(coords),
            height: target,
        })
        .collect())
}

fn preview_steps<T: ActionTransition>(
    cx: &ActionContext<'_>,
    world: &WorldState,
    centre: CoordsXY,
    steps: Vec<LandSetHeight>,
) -> Result<Validated<Vec<LandSetHeight>>, ActionResult> {
    let batch = NestedBatch::new(T::TITLE).query_all(cx, world, &steps)?;
    let height = world
        .map
        .tile_at(centre)
        .map_or(EngineConfig::DEFAULT_LAND_HEIGHT, |tile| tile.surface.height);
    let result = batch
        .finish()
        .with_expenditure(ExpenditureType::Landscaping)
        .with_position(surface_position(centre, height));
    Ok(Validated::new(result, steps))
}

fn apply_steps<T: ActionTransition>(
    cx: &ActionContext<'_>,
    world: &mut WorldState,
    validated: Validated<Vec<LandSetHeight>>,
) -> ActionResult {
    let position = validated.result.position;
    match NestedBatch::new(T::TITLE).execute_all(cx, world, &validated.plan) {
        Ok(batch) => {
            let result = batch.finish().with_expenditure(ExpenditureType::Landscaping);
            match position {
                Some(position) => result.with_position(position),
                None => result,
            }
        }
        Err(failure) => failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::kinds::testing::{GROUND, execute, owned_world, query};
    use crate::state::{PathElement, TileCoordsXY};

    fn height_at(world: &WorldState, x: i32, y: i32) -> u8 {
        world
            .map
            .tile(TileCoordsXY::new(x, y))
            .map(|tile| tile.surface.height)
            .unwrap_or_default()
    }

    #[test]
    fn set_rights_assigns_every_tile_in_range() {
        let mut world = WorldState::new(&EngineConfig::with_map_size(16));
        let body = LandSetRights {
            range: MapRange::new(64, 64, 128, 96),
            setting: LandRightsSetting::Owned as u8,
        };

        assert!(execute(&mut world, &body).is_ok());

        let owned = world
            .map
            .iter()
            .filter(|(_, tile)| tile.ownership == OwnershipFlags::OWNED)
            .map(|(coords, _)| coords)
            .collect::<Vec<_>>();
        assert_eq!(owned.len(), 3 * 2);
        assert!(owned.contains(&TileCoordsXY::new(4, 3)));
        assert!(world.invalidations().contains(&TileCoordsXY::new(2, 2)));
    }

    #[test]
    fn set_rights_rejects_unknown_setting() {
        let world = owned_world();
        let result = query(
            &world,
            &LandSetRights {
                setting: 9,
                ..LandSetRights::default()
            },
        );
        assert_eq!(result.status, Status::InvalidParameters);
    }

    #[test]
    fn set_height_costs_per_step() {
        let mut world = owned_world();
        let body = LandSetHeight {
            loc: CoordsXY::new(64, 64),
            height: GROUND + 3,
        };

        let result = execute(&mut world, &body);

        assert!(result.is_ok());
        assert_eq!(result.cost, -3 * EngineConfig::LAND_HEIGHT_STEP_PRICE);
        assert_eq!(result.expenditure, ExpenditureType::Landscaping);
        assert_eq!(height_at(&world, 2, 2), GROUND + 3);
    }

    #[test]
    fn set_height_enforces_bounds_ownership_and_clearance() {
        let mut world = owned_world();
        let loc = CoordsXY::new(64, 64);

        let low = query(&world, &LandSetHeight { loc, height: 0 });
        assert_eq!(low.status, Status::TooLow);
        let high = query(
            &world,
            &LandSetHeight {
                loc,
                height: EngineConfig::MAX_LAND_HEIGHT + 1,
            },
        );
        assert_eq!(high.status, Status::TooHigh);

        if let Some(tile) = world.map.tile_at_mut(loc) {
            tile.path = Some(PathElement {
                height: GROUND,
                ghost: false,
            });
        }
        let buried = query(
            &world,
            &LandSetHeight {
                loc,
                height: GROUND + 2,
            },
        );
        assert_eq!(buried.status, Status::NoClearance);

        world.cheats.disable_clearance_checks = true;
        assert!(query(&world, &LandSetHeight { loc, height: GROUND + 2 }).is_ok());

        if let Some(tile) = world.map.tile_at_mut(loc) {
            tile.ownership = OwnershipFlags::CONSTRUCTION_RIGHTS;
        }
        let unowned = query(&world, &LandSetHeight { loc, height: GROUND + 2 });
        assert_eq!(unowned.status, Status::NotOwned);

        world.cheats.sandbox_mode = true;
        assert!(query(&world, &LandSetHeight { loc, height: GROUND + 2 }).is_ok());
    }

    #[test]
    fn raise_lifts_only_the_lowest_tiles() {
        let mut world = owned_world();
        if let Some(tile) = world.map.tile_mut(TileCoordsXY::new(3, 2)) {
            tile.surface.height = GROUND + 4;
        }
        let body = LandRaise {
            centre: CoordsXY::new(80, 64),
            range: MapRange::new(64, 64, 96, 64),
        };

        let result = execute(&mut world, &body);

        assert!(result.is_ok(), "{result:?}");
        assert_eq!(height_at(&world, 2, 2), GROUND + 1);
        assert_eq!(height_at(&world, 3, 2), GROUND + 4);
        assert_eq!(result.cost, -EngineConfig::LAND_HEIGHT_STEP_PRICE);
        assert_eq!(result.nested().map(|summary| summary.steps), Some(1));
    }

    #[test]
    fn lower_sums_nested_costs() {
        let mut world = owned_world();
        let body = LandLower {
            centre: CoordsXY::new(64, 64),
            range: MapRange::new(64, 64, 96, 96),
        };

        let result = execute(&mut world, &body);

        assert!(result.is_ok(), "{result:?}");
        assert_eq!(result.cost, -4 * EngineConfig::LAND_HEIGHT_STEP_PRICE);
        for (x, y) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            assert_eq!(height_at(&world, x, y), GROUND - 1);
        }
    }

    #[test]
    fn raise_fails_whole_when_one_tile_is_unowned() {
        let mut world = owned_world();
        if let Some(tile) = world.map.tile_mut(TileCoordsXY::new(3, 2)) {
            tile.ownership = OwnershipFlags::empty();
        }
        let before = world.clone();
        let body = LandRaise {
            centre: CoordsXY::new(80, 64),
            range: MapRange::new(64, 64, 96, 64),
        };

        let result = query(&world, &body);

        assert_eq!(result.status, Status::NotOwned);
        assert_eq!(result.error_title, Some(StringId::CantRaiseLand));
        assert_eq!(
            result.nested().and_then(|summary| summary.failed_kind),
            Some(CommandKind::LandSetHeight)
        );
        assert_eq!(world, before);
    }
}
