use crate::finance::Money;
use crate::state::RideType;

/// Object oracle: prices and limits of buildable objects.
pub trait ObjectOracle: Send + Sync {
    fn banner(&self, banner_type: u8) -> Option<BannerEntry>;

    fn ride(&self, ride_type: RideType) -> Option<RideEntry>;
}

/// Definition of a banner object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BannerEntry {
    pub price: Money,
}

/// Definition of a ride type's track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RideEntry {
    /// Price of a single track piece.
    pub piece_price: Money,
    /// Highest a piece may sit above the land surface, in height units.
    pub max_height_above_ground: u8,
    /// Number of distinct track piece shapes.
    pub track_types: u8,
}

/// In-memory object table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticObjects {
    banners: Vec<BannerEntry>,
    rides: Vec<(RideType, RideEntry)>,
}

impl StaticObjects {
    pub const DEFAULT_BANNER_PRICE: Money = 40;

    pub fn new(banners: Vec<BannerEntry>, rides: Vec<(RideType, RideEntry)>) -> Self {
        Self { banners, rides }
    }
}

impl Default for StaticObjects {
    fn default() -> Self {
        Self::new(
            vec![
                BannerEntry {
                    price: Self::DEFAULT_BANNER_PRICE,
                },
                BannerEntry { price: 60 },
            ],
            vec![
                (
                    RideType::Maze,
                    RideEntry {
                        piece_price: 24,
                        max_height_above_ground: 0,
                        track_types: 1,
                    },
                ),
                (
                    RideType::Carousel,
                    RideEntry {
                        piece_price: 600,
                        max_height_above_ground: 0,
                        track_types: 1,
                    },
                ),
                (
                    RideType::Coaster,
                    RideEntry {
                        piece_price: 80,
                        max_height_above_ground: 40,
                        track_types: 8,
                    },
                ),
            ],
        )
    }
}

impl ObjectOracle for StaticObjects {
    fn banner(&self, banner_type: u8) -> Option<BannerEntry> {
        self.banners.get(usize::from(banner_type)).copied()
    }

    fn ride(&self, ride_type: RideType) -> Option<RideEntry> {
        self.rides
            .iter()
            .find(|(kind, _)| *kind == ride_type)
            .map(|(_, entry)| *entry)
    }
}
