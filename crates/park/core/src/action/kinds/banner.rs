//! Banner placement, removal and editing.

use crate::action::{
    ActionContext, ActionResult, ActionTransition, CommandKind, ParameterVisitor, ResultPayload,
    Status, Validated,
};
use crate::config::EngineConfig;
use crate::env::{OracleError, StringId};
use crate::finance::{ExpenditureType, Money};
use crate::state::{
    Banner, BannerIndex, BannerName, CoordsXYZD, Permissions, TileElement, WorldState,
    direction_valid,
};

use super::{
    check_colour, check_ownership, element_height, objects, removable, tile_at, tile_at_mut,
};

/// Places a banner on one edge of an existing footpath.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BannerPlace {
    pub loc: CoordsXYZD,
    pub banner_type: u8,
    pub colour: u8,
}

#[derive(Clone, Copy, Debug)]
pub struct BannerPlacement {
    index: BannerIndex,
    height: u8,
}

impl ActionTransition for BannerPlace {
    type Plan = BannerPlacement;

    const KIND: CommandKind = CommandKind::BannerPlace;
    const TITLE: StringId = StringId::CantPlaceBanner;

    fn required_permission() -> Permissions {
        Permissions::BUILD_SCENERY
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_coords_xyzd(&mut self.loc);
        visitor.visit_u8("banner_type", &mut self.banner_type);
        visitor.visit_u8("colour", &mut self.colour);
    }

    fn pre_validate(
        &self,
        cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<BannerPlacement>, ActionResult> {
        let tile = tile_at::<Self>(world, self.loc.xy())?;
        if !direction_valid(self.loc.direction) {
            return Err(Self::refuse(
                Status::InvalidParameters,
                StringId::InvalidDirection,
            ));
        }
        check_colour::<Self>(self.colour)?;
        let height = element_height::<Self>(self.loc.z)?;

        if !tile.path.is_some_and(|path| path.height == height) {
            return Err(Self::refuse(
                Status::InvalidParameters,
                StringId::BannerMustBeOnPath,
            ));
        }
        let occupied = tile.elements.iter().any(|element| {
            matches!(
                element,
                TileElement::Banner { height: h, direction, .. }
                    if *h == height && *direction == self.loc.direction
            )
        });
        if occupied {
            return Err(Self::refuse(
                Status::ItemAlreadyPlaced,
                StringId::BannerAlreadyPlaced,
            ));
        }
        check_ownership::<Self>(world, tile, height)?;

        if tile.elements.is_full() {
            return Err(Self::refuse(
                Status::NoFreeElements,
                StringId::TileElementLimitReached,
            ));
        }
        let index = world
            .banners
            .next_free()
            .ok_or_else(|| Self::refuse(Status::NoFreeElements, StringId::TooManyBanners))?;

        let entry = objects::<Self>(cx)?
            .banner(self.banner_type)
            .ok_or_else(|| Self::refuse(Status::InvalidParameters, StringId::InvalidBannerType))?;

        let result = ActionResult::ok()
            .with_cost(-entry.price)
            .with_expenditure(ExpenditureType::Landscaping)
            .with_position(self.loc.xyz());
        Ok(Validated::new(result, BannerPlacement { index, height }))
    }

    fn apply(
        &self,
        validated: Validated<BannerPlacement>,
        cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        let BannerPlacement { index, height } = validated.plan;
        let ghost = cx.is_ghost();

        let pushed = match tile_at_mut::<Self>(world, self.loc.xy()) {
            Ok(tile) => tile.push_element(TileElement::Banner {
                index,
                height,
                direction: self.loc.direction,
                ghost,
            }),
            Err(fault) => return fault,
        };
        if !pushed {
            return ActionResult::internal(Self::TITLE, "validated element slot unavailable");
        }

        world.banners.insert(
            index,
            Banner {
                banner_type: self.banner_type,
                position: self.loc,
                colour: self.colour,
                name: BannerName::new(),
                ghost,
            },
        );
        world.invalidate(self.loc.xy());

        validated.result.with_payload(ResultPayload::Banner(index))
    }
}

/// Removes the banner standing at a position and edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BannerRemove {
    pub loc: CoordsXYZD,
}

impl ActionTransition for BannerRemove {
    /// Banner index and its slot in the tile's element list.
    type Plan = (BannerIndex, usize);

    const KIND: CommandKind = CommandKind::BannerRemove;
    const TITLE: StringId = StringId::CantRemoveBanner;

    fn required_permission() -> Permissions {
        Permissions::BUILD_SCENERY
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_coords_xyzd(&mut self.loc);
    }

    fn pre_validate(
        &self,
        cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<Self::Plan>, ActionResult> {
        let tile = tile_at::<Self>(world, self.loc.xy())?;
        let height = element_height::<Self>(self.loc.z)?;

        let (slot, index) = tile
            .elements
            .iter()
            .enumerate()
            .find_map(|(slot, element)| match element {
                TileElement::Banner {
                    index,
                    height: h,
                    direction,
                    ghost,
                } if *h == height
                    && *direction == self.loc.direction
                    && removable(cx, *ghost) =>
                {
                    Some((slot, *index))
                }
                _ => None,
            })
            .ok_or_else(|| Self::refuse(Status::InvalidParameters, StringId::BannerNotFound))?;
        check_ownership::<Self>(world, tile, height)?;

        let Some(banner) = world.banners.get(index) else {
            return Err(ActionResult::internal(
                Self::TITLE,
                "banner element references a missing banner",
            ));
        };
        let refund: Money = if banner.ghost {
            0
        } else {
            let entry = objects::<Self>(cx)?
                .banner(banner.banner_type)
                .ok_or_else(|| {
                    ActionResult::from_oracle(
                        Self::TITLE,
                        OracleError::BannerTypeNotFound(banner.banner_type),
                    )
                })?;
            EngineConfig::refund_of(entry.price)
        };

        let result = ActionResult::ok()
            .with_cost(refund)
            .with_expenditure(ExpenditureType::Landscaping)
            .with_position(self.loc.xyz());
        Ok(Validated::new(result, (index, slot)))
    }

    fn apply(
        &self,
        validated: Validated<Self::Plan>,
        _cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        let (index, slot) = validated.plan;
        let removed = match tile_at_mut::<Self>(world, self.loc.xy()) {
            Ok(tile) => tile.elements.pop_at(slot),
            Err(fault) => return fault,
        };
        if removed.is_none() {
            return ActionResult::internal(Self::TITLE, "validated banner element vanished");
        }
        world.banners.remove(index);
        world.invalidate(self.loc.xy());
        validated.result
    }
}

/// Repaints an existing banner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BannerSetColour {
    pub banner: BannerIndex,
    pub colour: u8,
}

impl ActionTransition for BannerSetColour {
    type Plan = ();

    const KIND: CommandKind = CommandKind::BannerSetColour;
    const TITLE: StringId = StringId::CantRepaintBanner;

    fn required_permission() -> Permissions {
        Permissions::BUILD_SCENERY
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_u16("banner", &mut self.banner.0);
        visitor.visit_u8("colour", &mut self.colour);
    }

    fn pre_validate(
        &self,
        _cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<()>, ActionResult> {
        check_colour::<Self>(self.colour)?;
        let banner = world
            .banners
            .get(self.banner)
            .ok_or_else(|| Self::refuse(Status::InvalidParameters, StringId::BannerNotFound))?;

        Ok(Validated::preview(
            ActionResult::ok().with_position(banner.position.xyz()),
        ))
    }

    fn apply(
        &self,
        validated: Validated<()>,
        _cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        let Some(banner) = world.banners.get_mut(self.banner) else {
            return ActionResult::internal(Self::TITLE, "validated banner vanished before apply");
        };
        banner.colour = self.colour;
        let position = banner.position.xy();
        world.invalidate(position);
        validated.result
    }
}

/// Renames an existing banner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BannerSetName {
    pub banner: BannerIndex,
    pub name: String,
}

impl ActionTransition for BannerSetName {
    type Plan = BannerName;

    const KIND: CommandKind = CommandKind::BannerSetName;
    const TITLE: StringId = StringId::CantRenameBanner;

    fn required_permission() -> Permissions {
        Permissions::BUILD_SCENERY
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_u16("banner", &mut self.banner.0);
        visitor.visit_string("name", &mut self.name);
    }

    fn pre_validate(
        &self,
        _cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<BannerName>, ActionResult> {
        let name = BannerName::from(self.name.as_str())
            .map_err(|_| Self::refuse(Status::InvalidParameters, StringId::NameTooLong))?;
        let banner = world
            .banners
            .get(self.banner)
            .ok_or_else(|| Self::refuse(Status::InvalidParameters, StringId::BannerNotFound))?;

        Ok(Validated::new(
            ActionResult::ok().with_position(banner.position.xyz()),
            name,
        ))
    }

    fn apply(
        &self,
        validated: Validated<BannerName>,
        _cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        let Some(banner) = world.banners.get_mut(self.banner) else {
            return ActionResult::internal(Self::TITLE, "validated banner vanished before apply");
        };
        banner.name = validated.plan;
        let position = banner.position.xy();
        world.invalidate(position);
        validated.result
    }
}
