use buildspawn_catalog::loader::load_catalog_from_str;
use buildspawn_catalog::remote::RemoteBuildingEntry;
use buildspawn_core::building::BuildingConstruction;
use buildspawn_persist::construction_store::sanitize_rdns;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::FetchError;

/// A downloaded construction and the content hash it was served with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedBuilding {
    pub hash: String,
    pub construction: BuildingConstruction,
}

/// Where catalogs and building payloads come from. Implementations block;
/// callers run them off the game thread.
pub trait ContentSource: Send + Sync {
    fn fetch_catalog(&self) -> Result<Vec<RemoteBuildingEntry>, FetchError>;
    fn fetch_building(&self, rdns: &str) -> Result<FetchedBuilding, FetchError>;
}

/// Serves a mirrored catalog from disk:
/// `<root>/catalog.json` and `<root>/buildings/<rdns>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryContentSource {
    root: PathBuf,
}

impl DirectoryContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join("catalog.json")
    }

    pub fn building_path(&self, rdns: &str) -> PathBuf {
        self.root
            .join("buildings")
            .join(format!("{}.json", sanitize_rdns(rdns)))
    }

    /// Write a catalog and its payloads in the layout this source reads.
    pub fn write_mirror(
        &self,
        entries: &[RemoteBuildingEntry],
        buildings: &[(String, FetchedBuilding)],
    ) -> Result<(), FetchError> {
        let dir = self.root.join("buildings");
        std::fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        let catalog =
            serde_json::to_string_pretty(entries).map_err(|e| FetchError::Parse(e.to_string()))?;
        let path = self.catalog_path();
        std::fs::write(&path, catalog).map_err(|e| io_error(&path, e))?;
        for (rdns, fetched) in buildings {
            let json =
                serde_json::to_string(fetched).map_err(|e| FetchError::Parse(e.to_string()))?;
            let path = self.building_path(rdns);
            std::fs::write(&path, json).map_err(|e| io_error(&path, e))?;
        }
        Ok(())
    }
}

fn io_error(path: &Path, err: std::io::Error) -> FetchError {
    FetchError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

impl ContentSource for DirectoryContentSource {
    fn fetch_catalog(&self) -> Result<Vec<RemoteBuildingEntry>, FetchError> {
        let path = self.catalog_path();
        let text = std::fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        load_catalog_from_str(&text).map_err(|e| FetchError::Parse(e.to_string()))
    }

    fn fetch_building(&self, rdns: &str) -> Result<FetchedBuilding, FetchError> {
        let path = self.building_path(rdns);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(rdns.to_string()))
            }
            Err(e) => return Err(io_error(&path, e)),
        };
        serde_json::from_str(&text).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildspawn_catalog::defaults::{sample_catalog_entries, sample_construction};

    #[test]
    fn test_directory_mirror_roundtrip() {
        let root = std::env::temp_dir().join(format!("buildspawn-mirror-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        let source = DirectoryContentSource::new(&root);

        let entries = sample_catalog_entries();
        let building = entries[0].to_building(5).expect("valid");
        let fetched = FetchedBuilding {
            hash: entries[0].hash.clone(),
            construction: sample_construction(&building),
        };
        source
            .write_mirror(&entries, &[(entries[0].rdns.clone(), fetched.clone())])
            .expect("write mirror");

        assert_eq!(source.fetch_catalog().expect("catalog"), entries);
        assert_eq!(source.fetch_building(&entries[0].rdns).expect("building"), fetched);
        assert_eq!(
            source.fetch_building(&entries[1].rdns),
            Err(FetchError::NotFound(entries[1].rdns.clone()))
        );
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_missing_catalog_is_io_error() {
        let source =
            DirectoryContentSource::new(std::env::temp_dir().join("buildspawn-no-such-dir"));
        assert!(matches!(source.fetch_catalog(), Err(FetchError::Io { .. })));
    }
}
