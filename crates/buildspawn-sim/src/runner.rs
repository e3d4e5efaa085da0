use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use buildspawn_catalog::defaults::{sample_catalog_entries, sample_construction};
use buildspawn_catalog::remote::RemoteBuildingEntry;
use buildspawn_catalog::Catalog;
use buildspawn_core::config::SpawnerConfig;
use buildspawn_core::constants::CHUNK_SIZE;
use buildspawn_core::types::{BlockBox, ChunkPos};
use buildspawn_download::{
    BuildingCache, BuildingDownloader, ContentSource, DirectoryContentSource, DownloadError,
    DownloadProgress, FetchError, FetchedBuilding,
};
use buildspawn_persist::{
    load_snapshot, save_snapshot, CatalogSnapshot, ConstructionStore, PersistError,
};
use buildspawn_world::{
    BuildingEvent, BuildingTracker, ChunkOutcome, ChunkSpawner, NoSpawnReason, PlacementError,
    PlacementRequest, SpawnDataStore, StructurePlacer,
};
use glam::{DVec3, IVec2};
use thiserror::Error;

use crate::terrain::TerrainLevel;

/// How long the simulator waits for the initial download.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Ticks the simulated player stays at each waypoint.
const TICKS_PER_WAYPOINT: u64 = 40;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("download did not finish within {0:?}")]
    DownloadTimeout(Duration),
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

/// One simulator run.
#[derive(Debug, Clone)]
pub struct SimOptions {
    pub config: SpawnerConfig,
    /// Chunks loaded around the origin, in each direction.
    pub radius: i32,
    /// Game ticks the tracker runs for.
    pub ticks: u64,
    /// Mirror directory served by `DirectoryContentSource`; None uses the
    /// built-in samples.
    pub catalog_dir: Option<PathBuf>,
    /// Where to write the spawn-data region file.
    pub region_out: Option<PathBuf>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            config: SpawnerConfig::default(),
            radius: 8,
            ticks: 1200,
            catalog_dir: None,
            region_out: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DownloadSummary {
    pub total: usize,
    pub downloaded: usize,
    pub failed: usize,
    pub elapsed_ms: f64,
}

impl From<&DownloadProgress> for DownloadSummary {
    fn from(p: &DownloadProgress) -> Self {
        Self {
            total: p.total,
            downloaded: p.downloaded,
            failed: p.failed,
            elapsed_ms: p.elapsed.as_secs_f64() * 1000.0,
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimReport {
    pub world_seed: u64,
    pub catalog_size: usize,
    pub chunks_loaded: usize,
    pub chunks_processed: usize,
    pub chunks_deferred: usize,
    pub spawned: usize,
    pub blocks_placed: usize,
    pub blocks_cleared: usize,
    /// Spawns per building rdns.
    pub by_building: BTreeMap<String, usize>,
    /// Chunks that got nothing, by reason.
    pub empty_reasons: BTreeMap<String, usize>,
    pub enter_events: usize,
    pub exit_events: usize,
    pub region_bytes: usize,
    pub download: DownloadSummary,
    pub evaluate_ms: f64,
    /// Catalog came from a saved snapshot instead of the remote.
    #[serde(default)]
    pub resumed: bool,
}

/// Serves the built-in sample catalog from memory.
pub struct SampleContentSource {
    entries: Vec<RemoteBuildingEntry>,
    default_margin: i32,
}

impl SampleContentSource {
    pub fn new(default_margin: i32) -> Self {
        Self {
            entries: sample_catalog_entries(),
            default_margin,
        }
    }
}

impl ContentSource for SampleContentSource {
    fn fetch_catalog(&self) -> Result<Vec<RemoteBuildingEntry>, FetchError> {
        Ok(self.entries.clone())
    }

    fn fetch_building(&self, rdns: &str) -> Result<FetchedBuilding, FetchError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.rdns == rdns)
            .ok_or_else(|| FetchError::NotFound(rdns.to_string()))?;
        let building = entry
            .to_building(self.default_margin)
            .map_err(|e| FetchError::Parse(e.to_string()))?;
        Ok(FetchedBuilding {
            hash: entry.hash.clone(),
            construction: sample_construction(&building),
        })
    }
}

/// Stands in for the host world: counts what would be written.
#[derive(Default)]
pub struct CountingPlacer {
    blocks: AtomicUsize,
    cleared: AtomicUsize,
}

impl CountingPlacer {
    pub fn blocks_placed(&self) -> usize {
        self.blocks.load(Ordering::Relaxed)
    }

    pub fn blocks_cleared(&self) -> usize {
        self.cleared.load(Ordering::Relaxed)
    }
}

impl StructurePlacer for CountingPlacer {
    fn place(&self, request: &PlacementRequest<'_>) -> Result<(), PlacementError> {
        if request.construction.blocks.is_empty() {
            return Err(PlacementError::Rejected(format!(
                "'{}' has an empty construction",
                request.building.rdns
            )));
        }
        if let Some(region) = request.clear_region {
            let size = region.size();
            self.cleared
                .fetch_add((size.x * size.y * size.z) as usize, Ordering::Relaxed);
        }
        self.blocks
            .fetch_add(request.construction.block_count(), Ordering::Relaxed);
        log::debug!(
            "Placed {} ({} blocks) at {}",
            request.building.rdns,
            request.construction.block_count(),
            request.position.origin
        );
        Ok(())
    }
}

/// Chunks within `radius` of the origin, nearest first.
pub fn chunks_by_distance(radius: i32) -> Vec<ChunkPos> {
    let mut chunks: Vec<ChunkPos> = (-radius..=radius)
        .flat_map(|z| (-radius..=radius).map(move |x| IVec2::new(x, z)))
        .collect();
    chunks.sort_by_key(|c| (c.x * c.x + c.y * c.y, c.y, c.x));
    chunks
}

fn io_error(path: &Path, err: std::io::Error) -> SimError {
    SimError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

pub fn run(options: &SimOptions) -> Result<SimReport, SimError> {
    let source: Arc<dyn ContentSource> = match &options.catalog_dir {
        Some(dir) => {
            log::info!("Serving catalog from {}", dir.display());
            Arc::new(DirectoryContentSource::new(dir))
        }
        None => Arc::new(SampleContentSource::new(options.config.default_margin)),
    };
    run_with_source(options, source)
}

/// Fetch the catalog and keep a snapshot of it when a path is configured.
fn fetch_catalog(
    source: &dyn ContentSource,
    snapshot_path: Option<&Path>,
) -> Result<Vec<RemoteBuildingEntry>, SimError> {
    let entries = source.fetch_catalog()?;
    if let Some(path) = snapshot_path {
        save_snapshot(path, &CatalogSnapshot::new(entries.clone()))?;
        log::info!("Saved catalog snapshot to {}", path.display());
    }
    Ok(entries)
}

/// Bulk-download every catalog building and wait for completion.
fn download_all(
    downloader: &BuildingDownloader,
    catalog: &Catalog,
) -> Result<DownloadProgress, SimError> {
    let (tx, rx) = mpsc::channel();
    downloader.start(
        catalog,
        Box::new(|p: &DownloadProgress| {
            log::debug!(
                "Download {:.0}% ({:?})",
                p.fraction() * 100.0,
                p.current.as_deref().unwrap_or("-")
            )
        }),
        Box::new(move |p: &DownloadProgress| {
            let _ = tx.send(p.clone());
        }),
    )?;
    let progress = rx
        .recv_timeout(DOWNLOAD_TIMEOUT)
        .map_err(|_| SimError::DownloadTimeout(DOWNLOAD_TIMEOUT))?;
    log::info!(
        "Download finished: {}/{} ready, {} failed",
        progress.downloaded,
        progress.total,
        progress.failed
    );
    Ok(progress)
}

/// `run` against an explicit content source.
///
/// With a readable catalog snapshot at `config.catalog_path` the run resumes:
/// the catalog comes from the snapshot and buildings are loaded lazily, so
/// the source's catalog endpoint is never called.
pub fn run_with_source(
    options: &SimOptions,
    source: Arc<dyn ContentSource>,
) -> Result<SimReport, SimError> {
    let config = options.config.clone().sanitized();
    let mut report = SimReport {
        world_seed: config.world_seed,
        ..Default::default()
    };

    let snapshot = config.catalog_path.as_deref().and_then(load_snapshot);
    report.resumed = snapshot.is_some();
    let entries = match snapshot {
        Some(snapshot) => {
            log::info!(
                "Resuming from catalog snapshot ({} entries)",
                snapshot.entries.len()
            );
            snapshot.entries
        }
        None => fetch_catalog(source.as_ref(), config.catalog_path.as_deref())?,
    };
    let build = Catalog::from_entries(&entries, config.default_margin);
    for issue in build.issues.iter().filter(|i| i.is_warning()) {
        log::debug!("Catalog note: {issue}");
    }
    let catalog = Arc::new(build.catalog);
    report.catalog_size = catalog.len();

    let cache = Arc::new(BuildingCache::new(config.cache_max_entries));
    let store = config.cache_dir.as_ref().map(|dir| ConstructionStore::new(dir));
    let downloader = Arc::new(BuildingDownloader::new(source, cache, store));
    let progress = if report.resumed {
        downloader.resume(&catalog);
        downloader.progress()
    } else {
        download_all(&downloader, &catalog)?
    };
    report.download = DownloadSummary::from(&progress);

    let mut level = TerrainLevel::new(config.world_seed);
    let chunks = chunks_by_distance(options.radius);
    for chunk in &chunks {
        level.load_chunk(*chunk);
    }
    report.chunks_loaded = level.loaded_count();

    let placer = Arc::new(CountingPlacer::default());
    let spawn_data = Arc::new(SpawnDataStore::new());
    let spawner = ChunkSpawner::new(
        config.clone(),
        catalog,
        downloader.clone(),
        placer.clone(),
        spawn_data.clone(),
    );

    let started = Instant::now();
    let mut placed: Vec<BlockBox> = Vec::new();
    for chunk in &chunks {
        match spawner.evaluate_chunk(&level, *chunk) {
            ChunkOutcome::Spawned { rdns, bounds, .. } => {
                *report.by_building.entry(rdns).or_default() += 1;
                placed.push(bounds);
            }
            ChunkOutcome::NothingSpawned(reason) => {
                let key = match reason {
                    NoSpawnReason::NoCandidates => "no candidates",
                    NoSpawnReason::SearchExhausted { .. } => "search exhausted",
                    NoSpawnReason::PlacementFailed(_) => "placement failed",
                };
                *report.empty_reasons.entry(key.to_string()).or_default() += 1;
            }
            ChunkOutcome::Deferred => report.chunks_deferred += 1,
            ChunkOutcome::AlreadyProcessed => {}
        }
    }
    report.evaluate_ms = started.elapsed().as_secs_f64() * 1000.0;
    report.spawned = placed.len();
    report.blocks_placed = placer.blocks_placed();
    report.blocks_cleared = placer.blocks_cleared();
    report.chunks_processed = spawn_data.counts().0;

    let events = walk_player(
        &level,
        &spawn_data,
        &placed,
        options.ticks,
        config.tracker_interval_ticks,
    );
    report.enter_events = events
        .iter()
        .filter(|e| matches!(e, BuildingEvent::Enter { .. }))
        .count();
    report.exit_events = events.len() - report.enter_events;

    let region = spawn_data.save_region(config.world_seed)?;
    report.region_bytes = region.len();
    if let Some(path) = &options.region_out {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        std::fs::write(path, &region).map_err(|e| io_error(path, e))?;
        log::info!("Wrote spawn data for {} chunks to {}", spawn_data.len(), path.display());
    }

    let reloaded = SpawnDataStore::new();
    for warning in reloaded.load_region(&region, config.world_seed)? {
        log::warn!("Region reload: {warning}");
    }
    if reloaded.counts() != spawn_data.counts() {
        log::error!(
            "Region round trip mismatch: {:?} vs {:?}",
            reloaded.counts(),
            spawn_data.counts()
        );
    }

    Ok(report)
}

/// Walk one player through every placed building, stepping outside between
/// visits, and collect the tracker's events.
fn walk_player(
    level: &TerrainLevel,
    spawn_data: &SpawnDataStore,
    placed: &[BlockBox],
    ticks: u64,
    interval: u64,
) -> Vec<BuildingEvent> {
    let mut waypoints = Vec::with_capacity(placed.len() * 2);
    for bounds in placed {
        let aabb = bounds.to_aabb();
        let centre = (aabb.min + aabb.max) * 0.5;
        waypoints.push(DVec3::new(centre.x, aabb.min.y + 0.5, centre.z));
        waypoints.push(DVec3::new(centre.x, aabb.max.y + 40.0, centre.z + CHUNK_SIZE as f64));
    }

    let mut tracker = BuildingTracker::new(interval);
    let mut events = Vec::new();
    if waypoints.is_empty() {
        return events;
    }
    for tick in 0..ticks {
        let index = (tick / TICKS_PER_WAYPOINT) as usize % waypoints.len();
        tracker.tick(tick, level, spawn_data, &[(1, waypoints[index])], &mut events);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(seed: u64) -> SimOptions {
        SimOptions {
            config: SpawnerConfig {
                world_seed: seed,
                ..Default::default()
            },
            radius: 4,
            ticks: 400,
            ..Default::default()
        }
    }

    #[test]
    fn test_chunks_by_distance_starts_at_origin() {
        let chunks = chunks_by_distance(2);
        assert_eq!(chunks.len(), 25);
        assert_eq!(chunks[0], IVec2::ZERO);
        let last = chunks[24];
        assert_eq!(last.x.abs(), 2);
        assert_eq!(last.y.abs(), 2);
    }

    #[test]
    fn test_sample_source_serves_every_entry() {
        let source = SampleContentSource::new(5);
        let entries = source.fetch_catalog().unwrap();
        for entry in &entries {
            let fetched = source.fetch_building(&entry.rdns).unwrap();
            assert_eq!(fetched.hash, entry.hash);
            assert!(fetched.construction.block_count() > 0);
        }
        assert!(matches!(
            source.fetch_building("missing"),
            Err(FetchError::NotFound(_))
        ));
    }

    #[test]
    fn test_run_processes_every_chunk() {
        let report = run(&options(7)).unwrap();
        assert_eq!(report.chunks_loaded, 81);
        assert_eq!(report.chunks_processed, 81);
        assert_eq!(report.chunks_deferred, 0);
        assert_eq!(report.download.total, report.catalog_size);
        assert_eq!(report.download.downloaded, report.catalog_size);
        assert_eq!(report.spawned, report.by_building.values().sum::<usize>());
        assert_eq!(
            report.spawned + report.empty_reasons.values().sum::<usize>(),
            81
        );
        assert!(report.region_bytes > 0);
    }

    #[test]
    fn test_run_is_deterministic() {
        let a = run(&options(11)).unwrap();
        let b = run(&options(11)).unwrap();
        assert_eq!(a.by_building, b.by_building);
        assert_eq!(a.empty_reasons, b.empty_reasons);
        assert_eq!(a.enter_events, b.enter_events);
    }

    struct CountingSource {
        inner: SampleContentSource,
        catalog_calls: AtomicUsize,
        building_calls: AtomicUsize,
    }

    impl CountingSource {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: SampleContentSource::new(5),
                catalog_calls: AtomicUsize::new(0),
                building_calls: AtomicUsize::new(0),
            })
        }
    }

    impl ContentSource for CountingSource {
        fn fetch_catalog(&self) -> Result<Vec<RemoteBuildingEntry>, FetchError> {
            self.catalog_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_catalog()
        }

        fn fetch_building(&self, rdns: &str) -> Result<FetchedBuilding, FetchError> {
            self.building_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_building(rdns)
        }
    }

    #[test]
    fn test_second_run_resumes_from_snapshot() {
        let dir =
            std::env::temp_dir().join(format!("buildspawn-sim-resume-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut opts = options(13);
        opts.config.catalog_path = Some(dir.join("catalog.json"));
        opts.config.cache_dir = Some(dir.join("constructions"));

        let first_source = CountingSource::new();
        let first = run_with_source(&opts, first_source.clone()).unwrap();
        assert!(!first.resumed);
        assert_eq!(first_source.catalog_calls.load(Ordering::SeqCst), 1);
        assert_eq!(first_source.building_calls.load(Ordering::SeqCst), first.catalog_size);

        let second_source = CountingSource::new();
        let second = run_with_source(&opts, second_source.clone()).unwrap();
        assert!(second.resumed);
        assert_eq!(second_source.catalog_calls.load(Ordering::SeqCst), 0);
        assert_eq!(second_source.building_calls.load(Ordering::SeqCst), 0);
        assert_eq!(second.catalog_size, first.catalog_size);
        assert_eq!(second.chunks_processed, 81);
        assert_eq!(second.by_building, first.by_building);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_enter_exit_balanced() {
        let report = run(&options(3)).unwrap();
        assert!(report.exit_events <= report.enter_events);
        assert!(report.enter_events - report.exit_events <= 1);
    }
}
