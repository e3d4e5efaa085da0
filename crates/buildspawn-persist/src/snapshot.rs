use buildspawn_catalog::remote::RemoteBuildingEntry;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PersistError;

/// The last catalog fetched from the remote, kept so a restart can spawn
/// before the network answers. Spawn counters are not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Seconds since the Unix epoch when the catalog was fetched.
    pub fetched_at: u64,
    pub entries: Vec<RemoteBuildingEntry>,
}

impl CatalogSnapshot {
    pub fn new(entries: Vec<RemoteBuildingEntry>) -> Self {
        let fetched_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self {
            fetched_at,
            entries,
        }
    }
}

/// Load a snapshot. Returns None if the file doesn't exist or is unreadable.
pub fn load_snapshot(path: &Path) -> Option<CatalogSnapshot> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            log::warn!("Ignoring unreadable catalog snapshot {}: {e}", path.display());
            None
        }
    }
}

/// Save a snapshot as pretty JSON, creating parent directories.
pub fn save_snapshot(path: &Path, snapshot: &CatalogSnapshot) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
    }
    let json =
        serde_json::to_string_pretty(snapshot).map_err(|e| PersistError::JsonError(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| PersistError::io(path, e))
}
