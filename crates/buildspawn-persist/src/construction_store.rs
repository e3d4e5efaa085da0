use buildspawn_core::building::BuildingConstruction;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::compress;
use crate::error::PersistError;

/// File extension of stored constructions.
pub const CONSTRUCTION_EXT: &str = "bsc";

#[derive(Serialize, Deserialize)]
struct StoredConstruction {
    rdns: String,
    hash: String,
    construction: BuildingConstruction,
}

/// On-disk cache of downloaded constructions, one LZ4-compressed JSON file
/// per building.
#[derive(Debug, Clone)]
pub struct ConstructionStore {
    dir: PathBuf,
}

/// Map an rdns to a safe file stem.
pub fn sanitize_rdns(rdns: &str) -> String {
    rdns.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl ConstructionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, rdns: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{CONSTRUCTION_EXT}", sanitize_rdns(rdns)))
    }

    pub fn save(
        &self,
        rdns: &str,
        hash: &str,
        construction: &BuildingConstruction,
    ) -> Result<(), PersistError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| PersistError::io(&self.dir, e))?;
        let stored = StoredConstruction {
            rdns: rdns.to_string(),
            hash: hash.to_string(),
            construction: construction.clone(),
        };
        let json =
            serde_json::to_vec(&stored).map_err(|e| PersistError::JsonError(e.to_string()))?;
        let path = self.path_for(rdns);
        std::fs::write(&path, compress::compress_block(&json))
            .map_err(|e| PersistError::io(&path, e))
    }

    /// Stored construction for `rdns` if present, readable and matching
    /// `expected_hash`. Anything else is a miss.
    pub fn load(&self, rdns: &str, expected_hash: &str) -> Option<BuildingConstruction> {
        let (construction, hash) = self.load_stored(rdns)?;
        if hash != expected_hash {
            log::debug!(
                "Stored construction for '{rdns}' is stale (hash {hash} != {expected_hash})"
            );
            return None;
        }
        Some(construction)
    }

    /// Stored construction for `rdns` together with the hash it was saved
    /// under, for callers that have no expected hash to check against.
    pub fn load_stored(&self, rdns: &str) -> Option<(BuildingConstruction, String)> {
        let path = self.path_for(rdns);
        let bytes = std::fs::read(&path).ok()?;
        let decoded = compress::decompress_block(&bytes).and_then(|raw| {
            serde_json::from_slice::<StoredConstruction>(&raw)
                .map_err(|e| PersistError::JsonError(e.to_string()))
        });
        let stored = match decoded {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("Ignoring unreadable construction {}: {e}", path.display());
                return None;
            }
        };
        if stored.rdns != rdns {
            log::warn!("{} holds '{}', not '{rdns}'", path.display(), stored.rdns);
            return None;
        }
        Some((stored.construction, stored.hash))
    }

    pub fn remove(&self, rdns: &str) -> Result<(), PersistError> {
        let path = self.path_for(rdns);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistError::io(&path, e)),
        }
    }

    pub fn contains(&self, rdns: &str) -> bool {
        self.path_for(rdns).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildspawn_core::building::PlacedBlock;
    use glam::IVec3;

    fn temp_store(tag: &str) -> ConstructionStore {
        let dir = std::env::temp_dir().join(format!(
            "buildspawn-store-{tag}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        ConstructionStore::new(dir)
    }

    fn construction() -> BuildingConstruction {
        BuildingConstruction {
            blocks: vec![PlacedBlock {
                pos: IVec3::new(1, 0, 2),
                state: "minecraft:stone_bricks".into(),
            }],
            entities: vec![],
        }
    }

    #[test]
    fn test_sanitize_rdns() {
        assert_eq!(sanitize_rdns("com.example/../x y"), "com.example_.._x_y");
    }

    #[test]
    fn test_save_load_matching_hash() {
        let store = temp_store("match");
        store.save("com.example.a", "h1", &construction()).expect("save");
        assert!(store.contains("com.example.a"));
        assert_eq!(store.load("com.example.a", "h1"), Some(construction()));
        assert_eq!(store.load("com.example.a", "h2"), None);
        store.remove("com.example.a").expect("remove");
        assert!(!store.contains("com.example.a"));
        store.remove("com.example.a").expect("remove twice");
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_load_stored_returns_saved_hash() {
        let store = temp_store("stored");
        assert_eq!(store.load_stored("com.example.b"), None);
        store.save("com.example.b", "h7", &construction()).expect("save");
        assert_eq!(
            store.load_stored("com.example.b"),
            Some((construction(), "h7".to_string()))
        );
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_corrupt_file_is_miss() {
        let store = temp_store("corrupt");
        std::fs::create_dir_all(store.dir()).expect("mkdir");
        std::fs::write(store.path_for("x.y"), b"garbage").expect("write");
        assert_eq!(store.load("x.y", ""), None);
        let _ = std::fs::remove_dir_all(store.dir());
    }
}
