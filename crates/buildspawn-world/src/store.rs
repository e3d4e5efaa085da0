use buildspawn_core::types::ChunkPos;
use buildspawn_persist::chunk_data::ChunkSpawnData;
use buildspawn_persist::error::PersistError;
use buildspawn_persist::{load_region, save_region};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct StoreInner {
    records: HashMap<ChunkPos, ChunkSpawnData>,
    in_progress: HashSet<ChunkPos>,
}

/// Per-chunk spawn decisions plus the claim gate that keeps two evaluations
/// of the same chunk from running at once.
#[derive(Default)]
pub struct SpawnDataStore {
    inner: Mutex<StoreInner>,
}

/// Exclusive right to decide one chunk. Dropping it without `commit` leaves
/// the chunk undecided so it is evaluated again later.
pub struct ChunkClaim<'a> {
    store: &'a SpawnDataStore,
    pos: ChunkPos,
}

impl ChunkClaim<'_> {
    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    /// Record the decision and release the claim.
    pub fn commit(self, data: ChunkSpawnData) {
        let mut inner = self.store.lock();
        inner.records.insert(self.pos, data);
        // Drop runs next and removes the in-progress marker.
    }
}

impl Drop for ChunkClaim<'_> {
    fn drop(&mut self) {
        self.store.lock().in_progress.remove(&self.pos);
    }
}

impl SpawnDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Claim `pos` for evaluation. None if it is already processed or another
    /// evaluation holds it.
    pub fn claim(&self, pos: ChunkPos) -> Option<ChunkClaim<'_>> {
        let mut inner = self.lock();
        if inner.records.get(&pos).is_some_and(|d| d.processed) {
            return None;
        }
        if !inner.in_progress.insert(pos) {
            return None;
        }
        Some(ChunkClaim { store: self, pos })
    }

    pub fn get(&self, pos: ChunkPos) -> Option<ChunkSpawnData> {
        self.lock().records.get(&pos).cloned()
    }

    pub fn is_processed(&self, pos: ChunkPos) -> bool {
        self.lock().records.get(&pos).is_some_and(|d| d.processed)
    }

    /// Overwrite a record without claiming (manual placements, loading).
    pub fn record(&self, pos: ChunkPos, data: ChunkSpawnData) {
        self.lock().records.insert(pos, data);
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// (processed, with building) counts.
    pub fn counts(&self) -> (usize, usize) {
        let inner = self.lock();
        let processed = inner.records.values().filter(|d| d.processed).count();
        let built = inner.records.values().filter(|d| d.has_building()).count();
        (processed, built)
    }

    /// All records, sorted by chunk position.
    pub fn snapshot(&self) -> Vec<(ChunkPos, ChunkSpawnData)> {
        let inner = self.lock();
        let mut out: Vec<_> = inner
            .records
            .iter()
            .map(|(pos, data)| (*pos, data.clone()))
            .collect();
        out.sort_by_key(|(pos, _)| (pos.x, pos.y));
        out
    }

    pub fn save_region(&self, world_seed: u64) -> Result<Vec<u8>, PersistError> {
        save_region(&self.snapshot(), world_seed)
    }

    /// Load records from a region file. Returns the loader's warnings.
    pub fn load_region(&self, bytes: &[u8], world_seed: u64) -> Result<Vec<String>, PersistError> {
        let region = load_region(bytes, world_seed)?;
        let mut inner = self.lock();
        for (pos, data) in region.chunks {
            inner.records.insert(pos, data);
        }
        log::info!("Loaded {} chunk spawn records", inner.records.len());
        Ok(region.warnings)
    }
}
