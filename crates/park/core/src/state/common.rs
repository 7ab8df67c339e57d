use std::fmt;

use crate::config::EngineConfig;

/// Identity of a participant in a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// The session host. Always present and always a member of the host group.
    pub const HOST: Self = Self(0);

    /// Wire sentinel for "no actor" (system-issued actions).
    pub const UNSET_WIRE: u32 = u32::MAX;
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// Session-unique sequence number assigned when an action is queued for transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkId(pub u32);

impl NetworkId {
    /// Wire sentinel for "not assigned".
    pub const NONE_WIRE: u32 = u32::MAX;

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1) % Self::NONE_WIRE)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete simulation step; the unit of ordering for the network queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into the banner table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BannerIndex(pub u16);

/// Index into the ride table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RideId(pub u16);

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ride#{}", self.0)
    }
}

/// Edge / facing of an element on a tile, `0..=3`.
pub type Direction = u8;

/// Number of valid directions.
pub const NUM_DIRECTIONS: u8 = 4;

/// Returns true if `direction` names one of the four tile edges.
#[inline]
pub const fn direction_valid(direction: u8) -> bool {
    direction < NUM_DIRECTIONS
}

/// Horizontal world coordinate (32 units per tile).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordsXY {
    pub x: i32,
    pub y: i32,
}

impl CoordsXY {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World coordinate of the north corner of a tile.
    pub const fn from_tile(tile: TileCoordsXY) -> Self {
        Self {
            x: tile.x * EngineConfig::COORDS_XY_STEP,
            y: tile.y * EngineConfig::COORDS_XY_STEP,
        }
    }

    /// Tile containing this coordinate.
    pub const fn to_tile(self) -> TileCoordsXY {
        TileCoordsXY {
            x: self.x.div_euclid(EngineConfig::COORDS_XY_STEP),
            y: self.y.div_euclid(EngineConfig::COORDS_XY_STEP),
        }
    }

    /// Centre of the tile containing this coordinate.
    pub const fn to_tile_centre(self) -> Self {
        let tile = Self::from_tile(self.to_tile());
        Self {
            x: tile.x + EngineConfig::COORDS_XY_HALF_TILE,
            y: tile.y + EngineConfig::COORDS_XY_HALF_TILE,
        }
    }
}

/// World coordinate with elevation (8 units per height step).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordsXYZ {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CoordsXYZ {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn xy(self) -> CoordsXY {
        CoordsXY::new(self.x, self.y)
    }

    /// Elevation expressed in land height units.
    pub const fn height(self) -> i32 {
        self.z.div_euclid(EngineConfig::COORDS_Z_STEP)
    }
}

/// World coordinate with elevation and facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordsXYZD {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub direction: Direction,
}

impl CoordsXYZD {
    pub const fn new(x: i32, y: i32, z: i32, direction: Direction) -> Self {
        Self { x, y, z, direction }
    }

    pub const fn xy(self) -> CoordsXY {
        CoordsXY::new(self.x, self.y)
    }

    pub const fn xyz(self) -> CoordsXYZ {
        CoordsXYZ::new(self.x, self.y, self.z)
    }
}

/// Tile-space coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileCoordsXY {
    pub x: i32,
    pub y: i32,
}

impl TileCoordsXY {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive rectangle of world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapRange {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl MapRange {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Range covering a single tile.
    pub const fn single(coords: CoordsXY) -> Self {
        Self::new(coords.x, coords.y, coords.x, coords.y)
    }

    /// Returns the range with its corners ordered (`x1 <= x2`, `y1 <= y2`).
    pub fn normalise(self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    /// Clamps the range to the given world-coordinate bounds (inclusive).
    pub fn clamp(self, min: i32, max: i32) -> Self {
        let range = self.normalise();
        Self {
            x1: range.x1.clamp(min, max),
            y1: range.y1.clamp(min, max),
            x2: range.x2.clamp(min, max),
            y2: range.y2.clamp(min, max),
        }
    }

    /// Iterates the tiles covered by the range in row-major order.
    pub fn tiles(self) -> impl Iterator<Item = TileCoordsXY> {
        let range = self.normalise();
        let start = CoordsXY::new(range.x1, range.y1).to_tile();
        let end = CoordsXY::new(range.x2, range.y2).to_tile();
        (start.y..=end.y).flat_map(move |y| (start.x..=end.x).map(move |x| TileCoordsXY::new(x, y)))
    }

    /// Centre of the range, used to position UI feedback.
    pub fn centre(self) -> CoordsXY {
        let range = self.normalise();
        CoordsXY::new(
            (range.x1 + range.x2) / 2 + EngineConfig::COORDS_XY_HALF_TILE,
            (range.y1 + range.y2) / 2 + EngineConfig::COORDS_XY_HALF_TILE,
        )
    }
}
