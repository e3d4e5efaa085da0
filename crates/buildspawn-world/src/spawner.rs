use buildspawn_catalog::Catalog;
use buildspawn_core::bounds::BoundsCalculator;
use buildspawn_core::building::{BuildingConstruction, SpawnableBuilding};
use buildspawn_core::config::SpawnerConfig;
use buildspawn_core::constants::BIOME_SAMPLE_Y;
use buildspawn_core::math::{block_to_chunk, chunk_center, chunk_seed, chunks_in_box};
use buildspawn_core::rule::SpawnRule;
use buildspawn_core::spawn::SpawnPosition;
use buildspawn_core::types::{BlockBox, BlockPos, ChunkPos};
use buildspawn_download::BuildingSource;
use buildspawn_persist::chunk_data::ChunkSpawnData;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, RwLock};
use thiserror::Error;

use crate::level::LevelAccess;
use crate::store::SpawnDataStore;
use crate::validators::{SearchContext, ValidatorRegistry};

/// Everything the host needs to put a building into the world.
pub struct PlacementRequest<'a> {
    pub building: &'a SpawnableBuilding,
    pub construction: &'a BuildingConstruction,
    pub position: &'a SpawnPosition,
    /// Inclusive world box of the rotated building.
    pub bounds: BlockBox,
    /// Region to empty before placing, from the rule's `EnsureBoundsMode`.
    pub clear_region: Option<BlockBox>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("placement rejected: {0}")]
    Rejected(String),

    #[error("chunk {0} is not loaded")]
    ChunkNotLoaded(ChunkPos),

    #[error("construction for '{0}' is not available")]
    ConstructionUnavailable(String),
}

/// Writes a construction into the host world.
pub trait StructurePlacer: Send + Sync {
    fn place(&self, request: &PlacementRequest<'_>) -> Result<(), PlacementError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoSpawnReason {
    /// Nothing matched the biome, passed its roll and had a construction.
    NoCandidates,
    /// Every candidate's search came up empty.
    SearchExhausted { tried: usize },
    PlacementFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    /// Not evaluated; try again later.
    Deferred,
    AlreadyProcessed,
    Spawned {
        rdns: String,
        position: SpawnPosition,
        bounds: BlockBox,
    },
    NothingSpawned(NoSpawnReason),
}

struct Candidate {
    building: Arc<SpawnableBuilding>,
    rule: SpawnRule,
    construction: Arc<BuildingConstruction>,
}

/// Decides, once per chunk, whether a catalog building goes there.
pub struct ChunkSpawner {
    config: SpawnerConfig,
    catalog: RwLock<Arc<Catalog>>,
    source: Arc<dyn BuildingSource>,
    placer: Arc<dyn StructurePlacer>,
    store: Arc<SpawnDataStore>,
    validators: ValidatorRegistry,
}

impl ChunkSpawner {
    pub fn new(
        config: SpawnerConfig,
        catalog: Arc<Catalog>,
        source: Arc<dyn BuildingSource>,
        placer: Arc<dyn StructurePlacer>,
        store: Arc<SpawnDataStore>,
    ) -> Self {
        Self {
            config: config.sanitized(),
            catalog: RwLock::new(catalog),
            source,
            placer,
            store,
            validators: ValidatorRegistry::new(),
        }
    }

    #[must_use]
    pub fn with_validators(mut self, validators: ValidatorRegistry) -> Self {
        self.validators = validators;
        self
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<SpawnDataStore> {
        &self.store
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Swap in a refreshed catalog. Its spawn counters start from zero.
    pub fn replace_catalog(&self, catalog: Arc<Catalog>) {
        log::info!("Spawner catalog replaced ({} buildings)", catalog.len());
        *self.catalog.write().unwrap_or_else(|p| p.into_inner()) = catalog;
    }

    /// Evaluate one freshly loaded chunk. Each chunk is decided at most once;
    /// errors are logged and recorded as "nothing spawned".
    pub fn evaluate_chunk(&self, level: &dyn LevelAccess, chunk: ChunkPos) -> ChunkOutcome {
        if !self.source.is_ready() || !level.is_chunk_loaded(chunk) {
            return ChunkOutcome::Deferred;
        }
        let Some(claim) = self.store.claim(chunk) else {
            return ChunkOutcome::AlreadyProcessed;
        };

        let mut rng = StdRng::seed_from_u64(chunk_seed(self.config.world_seed, chunk));
        let Some(candidates) = self.candidates(level, chunk, &mut rng) else {
            // Claim dropped without a decision; the chunk is evaluated again.
            return ChunkOutcome::Deferred;
        };
        if candidates.is_empty() {
            claim.commit(ChunkSpawnData::processed_only());
            return ChunkOutcome::NothingSpawned(NoSpawnReason::NoCandidates);
        }

        let mut tried = 0;
        for candidate in &candidates {
            let building: &SpawnableBuilding = &candidate.building;
            let Some(validator) = self.validators.get(candidate.rule.position_type) else {
                log::warn!(
                    "No validator for {} ({})",
                    candidate.rule.position_type.name(),
                    building.rdns
                );
                continue;
            };
            let ctx = SearchContext {
                level,
                chunk,
                building,
                rule: &candidate.rule,
                columns_per_quadrant: self.config.columns_per_quadrant,
                max_failure_reasons: self.config.max_failure_reasons,
                max_height_jump: self.config.max_height_jump,
            };
            tried += 1;
            let position = match validator.find_position_with_details(&ctx, &mut rng) {
                Ok(position) => position,
                Err(failure) => {
                    log::debug!("{} in chunk {chunk}: {}", building.rdns, failure.summary());
                    continue;
                }
            };
            // Counted before placing, released again if the placer fails.
            if !building.record_spawn() {
                log::debug!("{} reached its cap during evaluation", building.rdns);
                continue;
            }

            return match self.place(building, &candidate.construction, &position) {
                Ok(bounds) => {
                    log::info!(
                        "Spawned {} in chunk {chunk} at {} ({}°)",
                        building.rdns,
                        position.origin,
                        position.rotation.degrees()
                    );
                    claim.commit(ChunkSpawnData::with_building(
                        building,
                        position.rotation,
                        &bounds,
                        &self.config.language,
                    ));
                    ChunkOutcome::Spawned {
                        rdns: building.rdns.clone(),
                        position,
                        bounds,
                    }
                }
                Err(e) => {
                    building.release_spawn();
                    log::warn!("Failed to place {} in chunk {chunk}: {e}", building.rdns);
                    claim.commit(ChunkSpawnData::processed_only());
                    ChunkOutcome::NothingSpawned(NoSpawnReason::PlacementFailed(e.to_string()))
                }
            };
        }

        claim.commit(ChunkSpawnData::processed_only());
        ChunkOutcome::NothingSpawned(NoSpawnReason::SearchExhausted { tried })
    }

    /// Buildings allowed in this chunk's biome that pass their roll, shuffled.
    /// None if one of them has no construction available yet.
    fn candidates(
        &self,
        level: &dyn LevelAccess,
        chunk: ChunkPos,
        rng: &mut StdRng,
    ) -> Option<Vec<Candidate>> {
        let catalog = self.catalog();
        let biome = level.biome_at(chunk_center(chunk, BIOME_SAMPLE_Y));
        let mut candidates = Vec::new();

        for building in catalog.candidates_for_biome(&biome) {
            let Some(rule) = building.rule_for_biome(&biome) else {
                continue;
            };
            if !rule.passes_roll(rng.gen_range(0.0..1.0)) {
                continue;
            }
            let Some(construction) = self.source.construction(&building.rdns) else {
                log::debug!(
                    "Deferring chunk {chunk}: construction for {} unavailable",
                    building.rdns
                );
                return None;
            };
            candidates.push(Candidate {
                building: Arc::clone(building),
                rule: rule.clone(),
                construction,
            });
        }
        candidates.shuffle(rng);
        Some(candidates)
    }

    fn place(
        &self,
        building: &SpawnableBuilding,
        construction: &BuildingConstruction,
        position: &SpawnPosition,
    ) -> Result<BlockBox, PlacementError> {
        let bounds = position.world_bounds(building);
        let entrance_y = position.entrance_world(building).y;
        let clear_region = position
            .rule
            .as_ref()
            .and_then(|r| r.ensure_bounds.clear_region(&bounds, entrance_y));
        self.placer.place(&PlacementRequest {
            building,
            construction,
            position,
            bounds,
            clear_region,
        })?;
        Ok(bounds)
    }

    /// Place `building` with its entrance at `entrance_pos`, turned towards
    /// `yaw`, bypassing rules and validators. Recorded on the origin chunk;
    /// does not count towards the building's cap.
    pub fn force_spawn(
        &self,
        level: &dyn LevelAccess,
        building: &SpawnableBuilding,
        entrance_pos: BlockPos,
        yaw: f32,
    ) -> Result<SpawnPosition, PlacementError> {
        let rotation = BoundsCalculator::rotation_for_yaw(building.entrance.yaw, yaw);
        let position = SpawnPosition::at_entrance(building, entrance_pos, rotation, None);
        let bounds = position.world_bounds(building);

        let guarded = bounds.inflate_xz(self.config.default_margin.max(0));
        if let Some(chunk) = chunks_in_box(&guarded)
            .into_iter()
            .find(|c| !level.is_chunk_loaded(*c))
        {
            return Err(PlacementError::ChunkNotLoaded(chunk));
        }

        let construction = self
            .source
            .construction(&building.rdns)
            .ok_or_else(|| PlacementError::ConstructionUnavailable(building.rdns.clone()))?;
        let bounds = self.place(building, &construction, &position)?;

        let origin_chunk = block_to_chunk(position.origin);
        self.store.record(
            origin_chunk,
            ChunkSpawnData::with_building(building, rotation, &bounds, &self.config.language),
        );
        log::info!(
            "Force-spawned {} at {} in chunk {origin_chunk}",
            building.rdns,
            position.origin
        );
        Ok(position)
    }
}
