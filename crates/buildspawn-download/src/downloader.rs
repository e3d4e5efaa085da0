use buildspawn_catalog::catalog::Catalog;
use buildspawn_core::building::BuildingConstruction;
use buildspawn_persist::construction_store::ConstructionStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::cache::BuildingCache;
use crate::error::DownloadError;
use crate::source::ContentSource;

/// How long the worker waits for a lazy fetch of the same building.
const FETCH_WAIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the bulk download currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Idle,
    Downloading,
    Ready,
    /// Drained with at least one failure. Still counts as ready.
    Failed,
}

/// Snapshot handed to callbacks and returned by `progress()`.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    pub state: DownloadState,
    pub total: usize,
    /// Fetched plus already available.
    pub downloaded: usize,
    pub failed: usize,
    /// rdns being fetched right now.
    pub current: Option<String>,
    pub elapsed: Duration,
}

impl DownloadProgress {
    pub fn processed(&self) -> usize {
        self.downloaded + self.failed
    }

    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed() as f64 / self.total as f64
        }
    }
}

/// What the spawner needs from the download side.
pub trait BuildingSource: Send + Sync {
    /// True once the catalog's constructions are available (or the session
    /// was marked ready).
    fn is_ready(&self) -> bool;
    /// Construction for `rdns`, fetching it if needed. None if unavailable
    /// right now.
    fn construction(&self, rdns: &str) -> Option<Arc<BuildingConstruction>>;
}

pub type ProgressCallback = Box<dyn Fn(&DownloadProgress) + Send>;
pub type CompleteCallback = Box<dyn FnOnce(&DownloadProgress) + Send>;

struct Shared {
    state: DownloadState,
    total: usize,
    downloaded: usize,
    failed: usize,
    current: Option<String>,
    started: Option<Instant>,
    finished: Option<Instant>,
}

impl Shared {
    fn snapshot(&self) -> DownloadProgress {
        let elapsed = match (self.started, self.finished) {
            (Some(s), Some(f)) => f.duration_since(s),
            (Some(s), None) => s.elapsed(),
            _ => Duration::ZERO,
        };
        DownloadProgress {
            state: self.state,
            total: self.total,
            downloaded: self.downloaded,
            failed: self.failed,
            current: self.current.clone(),
            elapsed,
        }
    }
}

/// Serial building downloader.
///
/// `start` queues every catalog building that is not available locally and
/// drains the queue on one worker thread, one fetch at a time.
pub struct BuildingDownloader {
    source: Arc<dyn ContentSource>,
    cache: Arc<BuildingCache>,
    store: Option<ConstructionStore>,
    shared: Arc<Mutex<Shared>>,
    /// Expected content hash per rdns from the last started catalog.
    hashes: RwLock<HashMap<String, String>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct Worker {
    source: Arc<dyn ContentSource>,
    cache: Arc<BuildingCache>,
    store: Option<ConstructionStore>,
    shared: Arc<Mutex<Shared>>,
}

impl BuildingDownloader {
    pub fn new(
        source: Arc<dyn ContentSource>,
        cache: Arc<BuildingCache>,
        store: Option<ConstructionStore>,
    ) -> Self {
        Self {
            source,
            cache,
            store,
            shared: Arc::new(Mutex::new(Shared {
                state: DownloadState::Idle,
                total: 0,
                downloaded: 0,
                failed: 0,
                current: None,
                started: None,
                finished: None,
            })),
            hashes: RwLock::new(HashMap::new()),
            worker: Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &Arc<BuildingCache> {
        &self.cache
    }

    pub fn progress(&self) -> DownloadProgress {
        lock(&self.shared).snapshot()
    }

    pub fn state(&self) -> DownloadState {
        lock(&self.shared).state
    }

    /// Download everything in `catalog` that is not already available.
    ///
    /// Rejected while a previous download is running. With nothing to fetch
    /// the state goes straight to `Ready` and `on_complete` runs before this
    /// returns.
    pub fn start(
        &self,
        catalog: &Catalog,
        on_progress: ProgressCallback,
        on_complete: CompleteCallback,
    ) -> Result<(), DownloadError> {
        let mut shared = lock(&self.shared);
        if shared.state == DownloadState::Downloading {
            return Err(DownloadError::AlreadyRunning);
        }

        self.remember_hashes(catalog);

        let mut queue = Vec::new();
        let mut available = 0;
        for building in catalog.iter() {
            if self.cache.contains(&building.rdns) {
                if !self
                    .cache
                    .invalidate_if_hash_mismatch(&building.rdns, &building.hash)
                {
                    available += 1;
                    continue;
                }
            }
            if let Some(construction) = self.load_from_store(&building.rdns, &building.hash) {
                self.cache.put(&building.rdns, construction, &building.hash);
                available += 1;
                continue;
            }
            queue.push(building.rdns.clone());
        }

        let now = Instant::now();
        shared.total = catalog.len();
        shared.downloaded = available;
        shared.failed = 0;
        shared.current = None;
        shared.started = Some(now);
        shared.finished = None;

        if queue.is_empty() {
            shared.state = DownloadState::Ready;
            shared.finished = Some(now);
            let snapshot = shared.snapshot();
            drop(shared);
            log::info!("All {} buildings already available", snapshot.total);
            on_complete(&snapshot);
            return Ok(());
        }

        shared.state = DownloadState::Downloading;
        drop(shared);
        log::info!(
            "Downloading {} of {} buildings ({} available locally)",
            queue.len(),
            catalog.len(),
            available
        );

        let worker = Worker {
            source: self.source.clone(),
            cache: self.cache.clone(),
            store: self.store.clone(),
            shared: self.shared.clone(),
        };
        let handle = thread::Builder::new()
            .name("building-downloader".into())
            .spawn(move || worker.drain(queue, on_progress, on_complete))
            .map_err(|e| {
                lock(&self.shared).state = DownloadState::Idle;
                DownloadError::WorkerSpawn(e.to_string())
            })?;

        let mut slot = self.worker.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = slot.replace(handle) {
            let _ = previous.join();
        }
        Ok(())
    }

    /// Block until the current worker (if any) has finished.
    pub fn wait(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("Download worker panicked");
            }
        }
    }

    /// Skip the bulk download, e.g. when resuming a session whose buildings
    /// are fetched lazily. Without a known hash, `ensure_building` trusts
    /// whatever the disk store holds.
    pub fn mark_ready(&self) {
        let mut shared = lock(&self.shared);
        if shared.state != DownloadState::Downloading {
            shared.state = DownloadState::Ready;
        }
    }

    /// `mark_ready` for a session resumed from a saved catalog: lazy loads
    /// are checked against that catalog's hashes.
    pub fn resume(&self, catalog: &Catalog) {
        self.remember_hashes(catalog);
        self.mark_ready();
        log::info!("Resumed with {} catalog buildings, fetching lazily", catalog.len());
    }

    fn remember_hashes(&self, catalog: &Catalog) {
        let mut hashes = self.hashes.write().unwrap_or_else(|p| p.into_inner());
        hashes.clear();
        hashes.extend(catalog.iter().map(|b| (b.rdns.clone(), b.hash.clone())));
    }

    pub fn is_ready(&self) -> bool {
        matches!(
            self.state(),
            DownloadState::Ready | DownloadState::Failed
        )
    }

    /// Construction for `rdns` from memory, then disk, then the remote.
    ///
    /// Never blocks on another thread: returns None right away while someone
    /// else is fetching the same building, and when the fetch fails.
    pub fn ensure_building(&self, rdns: &str) -> Option<Arc<BuildingConstruction>> {
        if let Some(found) = self.cache.get(rdns) {
            return Some(found);
        }
        let expected = self
            .hashes
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(rdns)
            .cloned();
        match expected {
            Some(hash) => {
                if let Some(construction) = self.load_from_store(rdns, &hash) {
                    return Some(self.cache.put(rdns, construction, &hash));
                }
            }
            None => {
                let stored = self.store.as_ref().and_then(|s| s.load_stored(rdns));
                if let Some((construction, hash)) = stored {
                    return Some(self.cache.put(rdns, construction, &hash));
                }
            }
        }
        if !self.cache.mark_downloading(rdns) {
            log::debug!("'{rdns}' is already being fetched");
            return None;
        }
        let result = self.source.fetch_building(rdns);
        let out = match result {
            Ok(fetched) => {
                save_to_store(self.store.as_ref(), rdns, &fetched.hash, &fetched.construction);
                Some(self.cache.put(rdns, fetched.construction, &fetched.hash))
            }
            Err(e) => {
                log::warn!("Failed to fetch building '{rdns}': {e}");
                None
            }
        };
        self.cache.clear_downloading(rdns);
        out
    }

    fn load_from_store(&self, rdns: &str, hash: &str) -> Option<BuildingConstruction> {
        self.store.as_ref()?.load(rdns, hash)
    }
}

impl BuildingSource for BuildingDownloader {
    fn is_ready(&self) -> bool {
        BuildingDownloader::is_ready(self)
    }

    fn construction(&self, rdns: &str) -> Option<Arc<BuildingConstruction>> {
        self.ensure_building(rdns)
    }
}

impl Worker {
    fn drain(
        self,
        queue: Vec<String>,
        on_progress: ProgressCallback,
        on_complete: CompleteCallback,
    ) {
        for rdns in queue {
            // A lazy fetch may hold the flag; block until it clears.
            let claimed = self.cache.wait_and_mark_downloading(&rdns, FETCH_WAIT_TIMEOUT);
            lock(&self.shared).current = Some(rdns.clone());

            let ok = if self.cache.contains(&rdns) {
                true
            } else if !claimed {
                log::warn!("Gave up waiting for another fetch of '{rdns}'");
                false
            } else {
                self.fetch(&rdns)
            };
            if claimed {
                self.cache.clear_downloading(&rdns);
            }

            let snapshot = {
                let mut shared = lock(&self.shared);
                if ok {
                    shared.downloaded += 1;
                } else {
                    shared.failed += 1;
                }
                shared.current = None;
                shared.snapshot()
            };
            on_progress(&snapshot);
        }

        let snapshot = {
            let mut shared = lock(&self.shared);
            shared.state = if shared.failed > 0 {
                DownloadState::Failed
            } else {
                DownloadState::Ready
            };
            shared.finished = Some(Instant::now());
            shared.snapshot()
        };
        log::info!(
            "Building download finished: {}/{} available, {} failed in {:.1?}",
            snapshot.downloaded,
            snapshot.total,
            snapshot.failed,
            snapshot.elapsed
        );
        on_complete(&snapshot);
    }

    fn fetch(&self, rdns: &str) -> bool {
        match self.source.fetch_building(rdns) {
            Ok(fetched) => {
                save_to_store(self.store.as_ref(), rdns, &fetched.hash, &fetched.construction);
                self.cache.put(rdns, fetched.construction, &fetched.hash);
                true
            }
            Err(e) => {
                log::warn!("Failed to download building '{rdns}': {e}");
                false
            }
        }
    }
}

fn save_to_store(
    store: Option<&ConstructionStore>,
    rdns: &str,
    hash: &str,
    construction: &BuildingConstruction,
) {
    if let Some(store) = store {
        if let Err(e) = store.save(rdns, hash, construction) {
            log::warn!("Failed to store building '{rdns}': {e}");
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|p| p.into_inner())
}
