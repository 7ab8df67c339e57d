//! Tile map: the part of the world the engine reasons about for validity.

use arrayvec::ArrayVec;
use bitflags::bitflags;

use super::common::{BannerIndex, CoordsXY, Direction, RideId, TileCoordsXY};
use crate::config::EngineConfig;

bitflags! {
    /// Ownership state of a tile.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct OwnershipFlags: u8 {
        /// Owned by the park; anything may be built.
        const OWNED              = 1 << 0;
        /// Construction rights only; elements may be built above/below the surface.
        const CONSTRUCTION_RIGHTS = 1 << 1;
        /// Available for purchase.
        const AVAILABLE          = 1 << 2;
    }
}

/// Terrain surface of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Surface {
    /// Land height in height units.
    pub height: u8,
    /// Water height in height units, 0 for dry land.
    pub water_height: u8,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            height: EngineConfig::DEFAULT_LAND_HEIGHT,
            water_height: 0,
        }
    }
}

/// Footpath segment on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathElement {
    /// Base height in height units.
    pub height: u8,
    /// Preview placement that is never charged or persisted.
    pub ghost: bool,
}

/// Constructed element occupying space on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileElement {
    /// Banner standing on one edge of a path.
    Banner {
        index: BannerIndex,
        height: u8,
        direction: Direction,
        ghost: bool,
    },
    /// One piece of ride track.
    Track {
        ride: RideId,
        track_type: u8,
        height: u8,
        direction: Direction,
        ghost: bool,
    },
}

impl TileElement {
    pub fn height(&self) -> u8 {
        match self {
            TileElement::Banner { height, .. } | TileElement::Track { height, .. } => *height,
        }
    }

    pub fn is_ghost(&self) -> bool {
        match self {
            TileElement::Banner { ghost, .. } | TileElement::Track { ghost, .. } => *ghost,
        }
    }

    /// Returns true if this element's vertical extent overlaps `[base, base + clearance)`.
    pub fn intersects(&self, base: u8, clearance: u8) -> bool {
        let own_base = self.height();
        let own_top = own_base.saturating_add(EngineConfig::ELEMENT_CLEARANCE);
        let top = base.saturating_add(clearance);
        own_base < top && base < own_top
    }
}

type ElementSlots = ArrayVec<TileElement, { EngineConfig::MAX_ELEMENTS_PER_TILE }>;

/// Contents of a single map tile.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub surface: Surface,
    pub ownership: OwnershipFlags,
    pub path: Option<PathElement>,
    pub elements: ElementSlots,
}

impl Tile {
    /// Returns true if anything is built on this tile.
    pub fn has_construction(&self) -> bool {
        self.path.is_some() || !self.elements.is_empty()
    }

    /// Returns true if `height` may be built at with the given ownership rules.
    ///
    /// Owned land accepts anything; construction rights accept elements that
    /// are clear of the surface.
    pub fn permits_building_at(&self, height: u8) -> bool {
        if self.ownership.contains(OwnershipFlags::OWNED) {
            return true;
        }
        self.ownership.contains(OwnershipFlags::CONSTRUCTION_RIGHTS)
            && (height >= self.surface.height.saturating_add(EngineConfig::ELEMENT_CLEARANCE)
                || height.saturating_add(EngineConfig::ELEMENT_CLEARANCE) <= self.surface.height)
    }

    /// Adds an element, returning false if the tile has no free element slots.
    pub fn push_element(&mut self, element: TileElement) -> bool {
        self.elements.try_push(element).is_ok()
    }

    /// Returns true if any non-ghost element overlaps the given vertical span.
    pub fn is_obstructed(&self, base: u8, clearance: u8) -> bool {
        self.elements
            .iter()
            .any(|element| !element.is_ghost() && element.intersects(base, clearance))
    }

    /// Removes ghost content from the tile.
    pub fn strip_ghosts(&mut self) {
        if self.path.is_some_and(|path| path.ghost) {
            self.path = None;
        }
        self.elements.retain(|element| !element.is_ghost());
    }
}

/// Square grid of tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileMap {
    size: u16,
    tiles: Vec<Tile>,
}

impl TileMap {
    /// Creates a flat, unowned map of `size * size` tiles.
    pub fn new(size: u16) -> Self {
        let size = size.clamp(EngineConfig::MIN_MAP_SIZE, EngineConfig::MAX_MAP_SIZE);
        let count = usize::from(size) * usize::from(size);
        Self {
            size,
            tiles: vec![Tile::default(); count],
        }
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    /// Largest valid world coordinate on either axis.
    ///
    /// The outermost ring of tiles is the map edge and cannot be built on.
    pub fn max_coord(&self) -> i32 {
        (i32::from(self.size) - 2) * EngineConfig::COORDS_XY_STEP
    }

    /// Returns true if the tile is inside the buildable area (the edge ring excluded).
    pub fn is_inside(&self, tile: TileCoordsXY) -> bool {
        let limit = i32::from(self.size) - 1;
        tile.x >= 1 && tile.y >= 1 && tile.x < limit && tile.y < limit
    }

    /// Returns true if a world coordinate lies inside the buildable area.
    pub fn contains(&self, coords: CoordsXY) -> bool {
        coords.x >= 0 && coords.y >= 0 && self.is_inside(coords.to_tile())
    }

    fn index(&self, tile: TileCoordsXY) -> Option<usize> {
        let size = i32::from(self.size);
        if tile.x < 0 || tile.y < 0 || tile.x >= size || tile.y >= size {
            return None;
        }
        usize::try_from(tile.y * size + tile.x).ok()
    }

    pub fn tile(&self, tile: TileCoordsXY) -> Option<&Tile> {
        self.index(tile).and_then(|index| self.tiles.get(index))
    }

    pub fn tile_mut(&mut self, tile: TileCoordsXY) -> Option<&mut Tile> {
        self.index(tile).and_then(|index| self.tiles.get_mut(index))
    }

    /// Tile at a world coordinate, if it lies in the buildable area.
    pub fn tile_at(&self, coords: CoordsXY) -> Option<&Tile> {
        if !self.contains(coords) {
            return None;
        }
        self.tile(coords.to_tile())
    }

    pub fn tile_at_mut(&mut self, coords: CoordsXY) -> Option<&mut Tile> {
        if !self.contains(coords) {
            return None;
        }
        self.tile_mut(coords.to_tile())
    }

    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Every tile with its coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoordsXY, &Tile)> {
        let size = i32::from(self.size);
        (0..size)
            .flat_map(move |y| (0..size).map(move |x| TileCoordsXY::new(x, y)))
            .zip(self.tiles.iter())
    }
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(EngineConfig::DEFAULT_MAP_SIZE)
    }
}
