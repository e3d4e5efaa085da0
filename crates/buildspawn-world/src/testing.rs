//! Layered in-memory level for tests.

use buildspawn_core::block::BlockKind;
use buildspawn_core::building::{Entrance, SpawnableBuilding};
use buildspawn_core::constants::{COLUMNS_PER_QUADRANT, MAX_FAILURE_REASONS, MAX_HEIGHT_JUMP};
use buildspawn_core::rule::{Biome, SpawnRule};
use buildspawn_core::types::{BlockPos, ChunkPos};
use glam::{IVec2, IVec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::level::LevelAccess;
use crate::validators::SearchContext;

/// Floor up to `ground`, then `fluid` up to `fluid_top`, then air.
pub struct GridLevel {
    pub ground: i32,
    pub fluid: BlockKind,
    pub fluid_top: Option<i32>,
    pub overrides: HashMap<BlockPos, BlockKind>,
    pub unloaded: HashSet<ChunkPos>,
    pub biome: Biome,
    pub min_y: i32,
    pub max_y: i32,
    pub reads: AtomicUsize,
}

impl GridLevel {
    pub fn land(ground: i32) -> Self {
        Self {
            ground,
            fluid: BlockKind::Water,
            fluid_top: None,
            overrides: HashMap::new(),
            unloaded: HashSet::new(),
            biome: Biome::new("minecraft:plains"),
            min_y: -64,
            max_y: 319,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn sea(floor: i32, surface: i32) -> Self {
        Self {
            fluid_top: Some(surface),
            biome: Biome::new("minecraft:ocean").with_tags(&["minecraft:is_ocean"]),
            ..Self::land(floor)
        }
    }

    pub fn with_fluid(mut self, fluid: BlockKind) -> Self {
        self.fluid = fluid;
        self
    }

    pub fn set(&mut self, pos: BlockPos, kind: BlockKind) {
        self.overrides.insert(pos, kind);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl LevelAccess for GridLevel {
    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool {
        !self.unloaded.contains(&chunk)
    }

    fn block_kind(&self, pos: BlockPos) -> BlockKind {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.overrides.get(&pos) {
            return *kind;
        }
        if pos.y <= self.ground {
            BlockKind::Floor
        } else if self.fluid_top.is_some_and(|top| pos.y <= top) {
            self.fluid
        } else {
            BlockKind::Air
        }
    }

    fn biome_at(&self, _pos: BlockPos) -> Biome {
        self.biome.clone()
    }

    fn min_y(&self) -> i32 {
        self.min_y
    }

    fn max_y(&self) -> i32 {
        self.max_y
    }
}

pub fn house(size: IVec3, entrance: IVec3) -> SpawnableBuilding {
    SpawnableBuilding::new(
        "test.house",
        1,
        size,
        Entrance {
            pos: entrance,
            yaw: 0.0,
        },
    )
}

/// Search context for chunk (0, 0) with default limits.
pub fn context<'a>(
    level: &'a GridLevel,
    building: &'a SpawnableBuilding,
    rule: &'a SpawnRule,
) -> SearchContext<'a> {
    SearchContext {
        level,
        chunk: IVec2::ZERO,
        building,
        rule,
        columns_per_quadrant: COLUMNS_PER_QUADRANT,
        max_failure_reasons: MAX_FAILURE_REASONS,
        max_height_jump: MAX_HEIGHT_JUMP,
    }
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
