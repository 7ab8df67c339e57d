//! Bincode world snapshots on disk.
//!
//! Snapshots go through [`WorldState::snapshot`], so ghost placements and
//! pending redraws are never persisted.

use std::fs;
use std::path::{Path, PathBuf};

use park_core::WorldState;

use super::{RepositoryError, Result};

/// Directory of named snapshots, stored as `{name}.bin`.
pub struct SnapshotStore {
    base_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.bin"))
    }

    /// Writes a snapshot atomically (temp file, then rename).
    pub fn save(&self, name: &str, world: &WorldState) -> Result<PathBuf> {
        let path = self.path(name);
        let temp_path = path.with_extension("bin.tmp");

        let bytes = bincode::serialize(&world.snapshot())
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(target: "park::repository", %name, path = %path.display(), "saved snapshot");
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<WorldState> {
        let path = self.path(name);
        if !path.exists() {
            return Err(RepositoryError::SnapshotNotFound(name.to_string()));
        }
        Self::load_file(&path)
    }

    /// Loads a snapshot from an arbitrary file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<WorldState> {
        let bytes = fs::read(path.as_ref())?;
        bincode::deserialize(&bytes).map_err(|e| RepositoryError::Serialization(e.to_string()))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path(name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use park_core::{BannerIndex, CoordsXYZD};
    use park_core::state::{Banner, BannerName};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn save_and_load_round_trip_without_ghosts() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path()).expect("store");

        let mut world = WorldState::default();
        world.park.paused = true;
        world.banners.insert(
            BannerIndex(3),
            Banner {
                banner_type: 0,
                position: CoordsXYZD::new(64, 64, 112, 0),
                colour: 1,
                name: BannerName::new(),
                ghost: true,
            },
        );

        store.save("start", &world).expect("save");
        let loaded = store.load("start").expect("load");

        assert!(loaded.park.paused);
        assert!(loaded.banners.is_empty());
        assert_eq!(loaded, world.snapshot());
    }

    #[test]
    fn missing_snapshot_is_reported_by_name() {
        let dir = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(dir.path()).expect("store");

        assert!(!store.exists("nope"));
        assert!(matches!(
            store.load("nope"),
            Err(RepositoryError::SnapshotNotFound(name)) if name == "nope"
        ));
    }
}
