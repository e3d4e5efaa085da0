use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::constants::FALLBACK_LANGUAGE;
use crate::error::CoreError;
use crate::rule::{Biome, SpawnRule};
use crate::types::BlockBox;

/// Entrance anchor: normalized block position inside the building plus the
/// yaw the building faces when placed unrotated. Rotation pivot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entrance {
    pub pos: IVec3,
    pub yaw: f32,
}

/// A catalog building that may spawn in the world.
///
/// Immutable apart from the per-world spawn counter, which resets whenever
/// the catalog is reloaded (it is never serialized).
#[derive(Debug, Serialize, Deserialize)]
pub struct SpawnableBuilding {
    /// Reverse-DNS identifier, unique in the catalog.
    pub rdns: String,
    /// Numeric primary key in the remote service.
    pub pk: i64,
    #[serde(default)]
    pub author: String,
    pub entrance: Entrance,
    /// Normalized size; the building occupies `0..size` on each axis.
    pub size: IVec3,
    /// Maximum spawns per world, 0 = unlimited.
    #[serde(default)]
    pub x_world: u32,
    /// Ordered rules; the first rule matching the biome wins.
    #[serde(default)]
    pub rules: Vec<SpawnRule>,
    /// Localized names keyed by language code.
    #[serde(default)]
    pub names: HashMap<String, String>,
    #[serde(default)]
    pub descriptions: HashMap<String, String>,
    /// Content hash of the construction payload.
    #[serde(default)]
    pub hash: String,
    #[serde(skip)]
    spawned: AtomicU32,
}

impl SpawnableBuilding {
    pub fn new(rdns: impl Into<String>, pk: i64, size: IVec3, entrance: Entrance) -> Self {
        Self {
            rdns: rdns.into(),
            pk,
            author: String::new(),
            entrance,
            size,
            x_world: 0,
            rules: Vec::new(),
            names: HashMap::new(),
            descriptions: HashMap::new(),
            hash: String::new(),
            spawned: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: SpawnRule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn with_name(mut self, lang: &str, name: &str) -> Self {
        self.names.insert(lang.to_string(), name.to_string());
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: &str) -> Self {
        self.author = author.to_string();
        self
    }

    #[must_use]
    pub fn with_cap(mut self, x_world: u32) -> Self {
        self.x_world = x_world;
        self
    }

    #[must_use]
    pub fn with_hash(mut self, hash: &str) -> Self {
        self.hash = hash.to_string();
        self
    }

    /// First rule whose biome filter matches.
    pub fn rule_for_biome(&self, biome: &Biome) -> Option<&SpawnRule> {
        self.rules.iter().find(|r| r.matches_biome(biome))
    }

    /// Localized name: `lang`, then the fallback language, then any, then rdns.
    pub fn display_name(&self, lang: &str) -> &str {
        self.names
            .get(lang)
            .or_else(|| self.names.get(FALLBACK_LANGUAGE))
            .or_else(|| self.names.values().next())
            .map_or(self.rdns.as_str(), |s| s.as_str())
    }

    pub fn description(&self, lang: &str) -> Option<&str> {
        self.descriptions
            .get(lang)
            .or_else(|| self.descriptions.get(FALLBACK_LANGUAGE))
            .map(|s| s.as_str())
    }

    /// Normalized box at the origin.
    pub fn local_bounds(&self) -> BlockBox {
        BlockBox::from_corners(IVec3::ZERO, self.size - IVec3::ONE)
    }

    /// Size must be positive and the entrance must sit inside the box.
    pub fn check_geometry(&self) -> Result<(), CoreError> {
        if self.size.cmple(IVec3::ZERO).any() {
            return Err(CoreError::InvalidSize(self.size));
        }
        if !self.local_bounds().contains(self.entrance.pos) {
            return Err(CoreError::EntranceOutsideBounds {
                entrance: self.entrance.pos,
                size: self.size,
            });
        }
        Ok(())
    }

    /// Blocks from the entrance to the top of the building, inclusive.
    pub fn height_above_entrance(&self) -> i32 {
        self.size.y - self.entrance.pos.y
    }

    pub fn spawn_count(&self) -> u32 {
        self.spawned.load(Ordering::Acquire)
    }

    pub fn can_spawn_more(&self) -> bool {
        self.x_world == 0 || self.spawn_count() < self.x_world
    }

    /// Count one placement. Returns false (and counts nothing) when the cap is
    /// already reached.
    pub fn record_spawn(&self) -> bool {
        if self.x_world == 0 {
            self.spawned.fetch_add(1, Ordering::AcqRel);
            return true;
        }
        self.spawned
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.x_world).then_some(n + 1)
            })
            .is_ok()
    }

    /// Give back a slot taken by `record_spawn` whose placement failed.
    pub fn release_spawn(&self) {
        let _ = self
            .spawned
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    pub fn reset_spawn_count(&self) {
        self.spawned.store(0, Ordering::Release);
    }
}

/// One block of a construction, relative to the building origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBlock {
    pub pos: IVec3,
    /// Block state string, e.g. `minecraft:oak_stairs[facing=north]`.
    pub state: String,
}

/// One entity of a construction, relative to the building origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedEntity {
    pub pos: DVec3,
    /// Opaque entity payload (tag data as text).
    pub data: String,
}

/// The downloadable block/entity payload of a building.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingConstruction {
    #[serde(default)]
    pub blocks: Vec<PlacedBlock>,
    #[serde(default)]
    pub entities: Vec<PlacedEntity>,
}

impl BuildingConstruction {
    /// Box covering every block, or None if there are no blocks.
    pub fn bounds(&self) -> Option<BlockBox> {
        let first = self.blocks.first()?.pos;
        let (min, max) = self
            .blocks
            .iter()
            .fold((first, first), |(lo, hi), b| (lo.min(b.pos), hi.max(b.pos)));
        Some(BlockBox { min, max })
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}
