//! Authoritative park state.
//!
//! [`WorldState`] is the world-state collaborator every command reads and
//! mutates. Runtime layers clone or query it freely but mutate it only
//! through [`crate::engine::ParkEngine`].
pub mod banner;
pub mod common;
pub mod map;
pub mod park;
pub mod player;
pub mod ride;

use std::collections::BTreeSet;

pub use banner::{Banner, BannerName, BannerTable};
pub use common::{
    BannerIndex, CoordsXY, CoordsXYZ, CoordsXYZD, Direction, MapRange, NUM_DIRECTIONS, NetworkId,
    PlayerId, RideId, Tick, TileCoordsXY, direction_valid,
};
pub use map::{OwnershipFlags, PathElement, Surface, Tile, TileElement, TileMap};
pub use park::{Cheats, ParkFlags};
pub use player::{GroupId, Permissions, Player, PlayerGroup, PlayerList};
pub use ride::{Ride, RideStatus, RideTable, RideType};

use crate::config::EngineConfig;
use crate::finance::ParkFinance;

/// Canonical snapshot of the deterministic park state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldState {
    pub map: TileMap,
    pub banners: BannerTable,
    pub rides: RideTable,
    pub players: PlayerList,
    pub park: ParkFlags,
    pub cheats: Cheats,
    pub finance: ParkFinance,
    /// Tiles touched since the last drain, for the renderer.
    #[cfg_attr(feature = "serde", serde(skip))]
    invalidations: BTreeSet<TileCoordsXY>,
}

impl WorldState {
    /// Creates a flat park from the given configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            map: TileMap::new(config.map_size),
            banners: BannerTable::default(),
            rides: RideTable::default(),
            players: PlayerList::default(),
            park: ParkFlags::default(),
            cheats: Cheats::default(),
            finance: ParkFinance::new(config.starting_cash, config.max_loan),
            invalidations: BTreeSet::new(),
        }
    }

    /// Marks the tile containing `coords` for redraw.
    pub fn invalidate(&mut self, coords: CoordsXY) {
        self.invalidations.insert(coords.to_tile());
    }

    pub fn invalidations(&self) -> &BTreeSet<TileCoordsXY> {
        &self.invalidations
    }

    /// Drains the pending redraw set.
    pub fn take_invalidations(&mut self) -> BTreeSet<TileCoordsXY> {
        std::mem::take(&mut self.invalidations)
    }

    /// Removes every ghost placement from the map and object tables.
    pub fn strip_ghosts(&mut self) {
        for tile in self.map.tiles_mut() {
            tile.strip_ghosts();
        }
        self.banners.strip_ghosts();
    }

    /// Copy of the state suitable for persisting: ghosts and redraw state removed.
    pub fn snapshot(&self) -> Self {
        let mut snapshot = self.clone();
        snapshot.strip_ghosts();
        snapshot.invalidations.clear();
        snapshot
    }

    /// SHA-256 over the bincode encoding of [`Self::snapshot`].
    ///
    /// Two participants that applied the same ordered input report the same root.
    #[cfg(feature = "serde")]
    pub fn state_root(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        if let Ok(bytes) = bincode::serialize(&self.snapshot()) {
            hasher.update(&bytes);
        }
        hasher.finalize().into()
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
