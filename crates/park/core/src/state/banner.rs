use std::collections::BTreeMap;

use arrayvec::ArrayString;

use super::common::{BannerIndex, CoordsXYZD};
use crate::config::EngineConfig;

pub type BannerName = ArrayString<{ EngineConfig::MAX_BANNER_NAME }>;

/// A banner object standing on a footpath edge.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Banner {
    /// Object entry the banner was built from; resolves its price.
    pub banner_type: u8,
    pub position: CoordsXYZD,
    pub colour: u8,
    pub name: BannerName,
    pub ghost: bool,
}

/// Fixed-capacity banner table. Indices are reused lowest-first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BannerTable {
    entries: BTreeMap<BannerIndex, Banner>,
}

impl BannerTable {
    pub fn get(&self, index: BannerIndex) -> Option<&Banner> {
        self.entries.get(&index)
    }

    pub fn get_mut(&mut self, index: BannerIndex) -> Option<&mut Banner> {
        self.entries.get_mut(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowest unused index, or `None` when the table is full.
    pub fn next_free(&self) -> Option<BannerIndex> {
        (0..EngineConfig::MAX_BANNERS)
            .filter_map(|raw| u16::try_from(raw).ok())
            .map(BannerIndex)
            .find(|index| !self.entries.contains_key(index))
    }

    pub fn insert(&mut self, index: BannerIndex, banner: Banner) {
        self.entries.insert(index, banner);
    }

    pub fn remove(&mut self, index: BannerIndex) -> Option<Banner> {
        self.entries.remove(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BannerIndex, &Banner)> {
        self.entries.iter().map(|(index, banner)| (*index, banner))
    }

    pub(crate) fn strip_ghosts(&mut self) {
        self.entries.retain(|_, banner| !banner.ghost);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banner() -> Banner {
        Banner {
            banner_type: 0,
            position: CoordsXYZD::new(32, 32, 112, 0),
            colour: 0,
            name: BannerName::new(),
            ghost: false,
        }
    }

    #[test]
    fn next_free_reuses_lowest_index() {
        let mut table = BannerTable::default();
        table.insert(BannerIndex(0), banner());
        table.insert(BannerIndex(1), banner());
        table.insert(BannerIndex(2), banner());
        assert_eq!(table.next_free(), Some(BannerIndex(3)));

        table.remove(BannerIndex(1));
        assert_eq!(table.next_free(), Some(BannerIndex(1)));
    }

    #[test]
    fn full_table_has_no_free_index() {
        let mut table = BannerTable::default();
        for raw in 0..EngineConfig::MAX_BANNERS as u16 {
            table.insert(BannerIndex(raw), banner());
        }
        assert_eq!(table.next_free(), None);
    }
}
