use crate::finance::Money;

/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Side length of a freshly created map, in tiles.
    pub map_size: u16,
    /// Cash the park starts with.
    pub starting_cash: Money,
    /// Upper bound for the park loan.
    pub max_loan: Money,
}

impl EngineConfig {
    // ===== coordinate system =====
    /// World units per tile along x/y.
    pub const COORDS_XY_STEP: i32 = 32;
    pub const COORDS_XY_HALF_TILE: i32 = Self::COORDS_XY_STEP / 2;
    /// World units per land height step.
    pub const COORDS_Z_STEP: i32 = 8;

    // ===== map bounds =====
    pub const MIN_MAP_SIZE: u16 = 3;
    pub const MAX_MAP_SIZE: u16 = 256;
    pub const MIN_LAND_HEIGHT: u8 = 2;
    pub const MAX_LAND_HEIGHT: u8 = 142;
    /// Highest elevation (height units) a constructed element may be placed at.
    pub const MAX_ELEMENT_HEIGHT: u8 = 248;
    /// Clearance (height units) a constructed element occupies above its base.
    pub const ELEMENT_CLEARANCE: u8 = 4;
    pub const DEFAULT_LAND_HEIGHT: u8 = 14;
    /// Constructed elements a single tile can hold (path excluded).
    pub const MAX_ELEMENTS_PER_TILE: usize = 8;

    // ===== object tables =====
    pub const MAX_BANNERS: usize = 250;
    pub const MAX_RIDES: usize = 255;
    pub const MAX_BANNER_NAME: usize = 32;
    /// Number of entries in the colour palette.
    pub const COLOUR_COUNT: u8 = 32;
    pub const MAX_PLAYER_GROUPS: usize = 16;

    // ===== prices =====
    pub const LAND_HEIGHT_STEP_PRICE: Money = 20;
    pub const FOOTPATH_PRICE: Money = 12;
    pub const FOOTPATH_REFUND: Money = 10;
    /// Refund share, in quarters, returned when a constructed item is removed.
    pub const REFUND_QUARTERS: Money = 3;
    /// Upper bound of a single `AddMoney` cheat.
    pub const MAX_CHEAT_MONEY: i32 = 1_000_000;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAP_SIZE: u16 = 64;
    pub const DEFAULT_STARTING_CASH: Money = 10_000;
    pub const DEFAULT_MAX_LOAN: Money = 20_000;

    pub fn new() -> Self {
        Self {
            map_size: Self::DEFAULT_MAP_SIZE,
            starting_cash: Self::DEFAULT_STARTING_CASH,
            max_loan: Self::DEFAULT_MAX_LOAN,
        }
    }

    pub fn with_map_size(map_size: u16) -> Self {
        Self {
            map_size: map_size.clamp(Self::MIN_MAP_SIZE, Self::MAX_MAP_SIZE),
            ..Self::new()
        }
    }

    /// Applies the refund share to a purchase price.
    pub const fn refund_of(price: Money) -> Money {
        price * Self::REFUND_QUARTERS / 4
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
