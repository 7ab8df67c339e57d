use std::collections::BTreeMap;

use super::common::RideId;
use crate::config::EngineConfig;

/// Ride families the engine knows how to build.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::FromRepr,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum RideType {
    /// Hedge maze; every track piece is an independent segment.
    #[default]
    Maze = 0,
    Carousel = 1,
    Coaster = 2,
}

/// Operating state of a ride.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::FromRepr,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum RideStatus {
    #[default]
    Closed = 0,
    Open = 1,
    Testing = 2,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ride {
    pub ride_type: RideType,
    pub status: RideStatus,
    pub colour: u8,
}

impl Ride {
    pub fn new(ride_type: RideType, colour: u8) -> Self {
        Self {
            ride_type,
            status: RideStatus::Closed,
            colour,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == RideStatus::Closed
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RideTable {
    entries: BTreeMap<RideId, Ride>,
}

impl RideTable {
    pub fn get(&self, id: RideId) -> Option<&Ride> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: RideId) -> Option<&mut Ride> {
        self.entries.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowest unused ride id, or `None` when the table is full.
    pub fn next_free(&self) -> Option<RideId> {
        (0..EngineConfig::MAX_RIDES)
            .filter_map(|raw| u16::try_from(raw).ok())
            .map(RideId)
            .find(|id| !self.entries.contains_key(id))
    }

    pub fn insert(&mut self, id: RideId, ride: Ride) {
        self.entries.insert(id, ride);
    }

    pub fn remove(&mut self, id: RideId) -> Option<Ride> {
        self.entries.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RideId, &Ride)> {
        self.entries.iter().map(|(id, ride)| (*id, ride))
    }
}
