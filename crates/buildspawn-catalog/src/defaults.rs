//! Built-in sample catalog used when no remote catalog is configured.
//! Entries are authored in capture coordinates like real uploads.

use buildspawn_core::building::{BuildingConstruction, PlacedBlock, PlacedEntity, SpawnableBuilding};
use buildspawn_core::rule::{EnsureBoundsMode, PositionType};
use glam::{DVec3, IVec3};
use std::collections::HashMap;

use crate::remote::{RemoteBuildingEntry, RemoteSpawnRule};

pub const SAMPLE_AUTHOR: &str = "buildspawn";

struct Sample {
    rdns: &'static str,
    name: &'static str,
    size: [i32; 3],
    entrance: [i32; 3],
    yaw: f32,
    x_world: u32,
    position_type: PositionType,
    biomes: &'static [&'static str],
    chance: f64,
    y_range: (i32, i32),
    ensure_bounds: EnsureBoundsMode,
}

const SAMPLES: &[Sample] = &[
    Sample {
        rdns: "com.buildspawn.sample.hut",
        name: "Meadow Hut",
        size: [7, 6, 5],
        entrance: [3, 1, 0],
        yaw: 180.0,
        x_world: 0,
        position_type: PositionType::OnGround,
        biomes: &["plains", "forest", "meadow"],
        chance: 0.35,
        y_range: (50, 140),
        ensure_bounds: EnsureBoundsMode::AboveEntrance,
    },
    Sample {
        rdns: "com.buildspawn.sample.reef_shrine",
        name: "Reef Shrine",
        size: [5, 5, 5],
        entrance: [2, 1, 0],
        yaw: 180.0,
        x_world: 3,
        position_type: PositionType::BottomWater,
        biomes: &["ocean"],
        chance: 0.5,
        y_range: (-20, 60),
        ensure_bounds: EnsureBoundsMode::None,
    },
    Sample {
        rdns: "com.buildspawn.sample.dock",
        name: "Floating Dock",
        size: [9, 3, 4],
        entrance: [4, 0, 0],
        yaw: 180.0,
        x_world: 0,
        position_type: PositionType::OnWater,
        biomes: &["ocean", "river"],
        chance: 0.2,
        y_range: (55, 70),
        ensure_bounds: EnsureBoundsMode::None,
    },
    Sample {
        rdns: "com.buildspawn.sample.stilt_house",
        name: "Stilt House",
        size: [6, 7, 6],
        entrance: [3, 1, 0],
        yaw: 180.0,
        x_world: 0,
        position_type: PositionType::OverWater,
        biomes: &["swamp", "river", "ocean"],
        chance: 0.25,
        y_range: (55, 75),
        ensure_bounds: EnsureBoundsMode::AboveEntrance,
    },
    Sample {
        rdns: "com.buildspawn.sample.sky_platform",
        name: "Sky Platform",
        size: [8, 4, 8],
        entrance: [4, 1, 0],
        yaw: 180.0,
        x_world: 1,
        position_type: PositionType::OnAir,
        biomes: &[],
        chance: 0.05,
        y_range: (150, 220),
        ensure_bounds: EnsureBoundsMode::All,
    },
    Sample {
        rdns: "com.buildspawn.sample.bunker",
        name: "Deep Bunker",
        size: [6, 4, 6],
        entrance: [3, 0, 0],
        yaw: 180.0,
        x_world: 0,
        position_type: PositionType::UnderGround,
        biomes: &["overworld", "plains", "desert"],
        chance: 0.15,
        y_range: (-40, 30),
        ensure_bounds: EnsureBoundsMode::All,
    },
    Sample {
        rdns: "com.buildspawn.sample.lava_forge",
        name: "Lava Forge",
        size: [5, 4, 5],
        entrance: [2, 1, 0],
        yaw: 180.0,
        x_world: 2,
        position_type: PositionType::OverLava,
        biomes: &["nether", "badlands", "basalt_deltas"],
        chance: 0.3,
        y_range: (-60, 80),
        ensure_bounds: EnsureBoundsMode::AboveEntrance,
    },
];

/// Remote-format entries for the built-in sample buildings.
///
/// Each one is captured at a different offset so normalization is exercised.
pub fn sample_catalog_entries() -> Vec<RemoteBuildingEntry> {
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let offset = IVec3::new(i as i32 * 100, 64, -(i as i32) * 50);
            let min = offset;
            let max = offset + IVec3::from_array(s.size) - IVec3::ONE;
            let entrance = offset + IVec3::from_array(s.entrance);
            RemoteBuildingEntry {
                rdns: s.rdns.to_string(),
                pk: i as i64 + 1,
                author: SAMPLE_AUTHOR.to_string(),
                name: HashMap::from([("en_us".to_string(), s.name.to_string())]),
                description: HashMap::new(),
                min_corner: min.to_array(),
                max_corner: max.to_array(),
                entrance: entrance.to_array(),
                entrance_yaw: s.yaw,
                x_world: s.x_world,
                hash: format!("sample-{}", i + 1),
                rules: vec![RemoteSpawnRule {
                    biomes: s.biomes.iter().map(|b| b.to_string()).collect(),
                    chance: s.chance,
                    position_type: s.position_type,
                    y_min: s.y_range.0,
                    y_max: s.y_range.1,
                    margin: None,
                    ensure_bounds: s.ensure_bounds,
                }],
            }
        })
        .collect()
}

/// Hollow shell with a floor, an opening at the entrance and one marker
/// entity in the middle.
pub fn sample_construction(building: &SpawnableBuilding) -> BuildingConstruction {
    let size = building.size;
    let door = building.entrance.pos;
    let mut blocks = Vec::new();
    for x in 0..size.x {
        for y in 0..size.y {
            for z in 0..size.z {
                let shell = x == 0 || z == 0 || x == size.x - 1 || z == size.z - 1;
                let floor = y == 0;
                let roof = y == size.y - 1;
                let pos = IVec3::new(x, y, z);
                let doorway =
                    pos.x == door.x && pos.z == door.z && (y == door.y || y == door.y + 1);
                if doorway {
                    continue;
                }
                let state = if floor {
                    "minecraft:cobblestone"
                } else if roof {
                    "minecraft:spruce_slab[type=bottom]"
                } else if shell {
                    "minecraft:oak_planks"
                } else {
                    continue;
                };
                blocks.push(PlacedBlock {
                    pos,
                    state: state.to_string(),
                });
            }
        }
    }
    let centre = size.as_dvec3() * 0.5;
    BuildingConstruction {
        blocks,
        entities: vec![PlacedEntity {
            pos: DVec3::new(centre.x, 1.0, centre.z),
            data: format!("{{id:\"minecraft:armor_stand\",CustomName:\"{}\"}}", building.rdns),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_cover_every_position_type() {
        let entries = sample_catalog_entries();
        for pt in buildspawn_core::rule::ALL_POSITION_TYPES {
            assert!(
                entries.iter().any(|e| e.rules[0].position_type == pt),
                "no sample for {}",
                pt.name()
            );
        }
    }

    #[test]
    fn test_sample_construction_fits_size() {
        let entry = &sample_catalog_entries()[0];
        let building = entry.to_building(5).expect("valid");
        let construction = sample_construction(&building);
        let bounds = construction.bounds().expect("non-empty");
        assert_eq!(bounds.min, IVec3::ZERO);
        assert_eq!(bounds.max, building.size - IVec3::ONE);
        assert!(!construction
            .blocks
            .iter()
            .any(|b| b.pos == building.entrance.pos));
        assert_eq!(construction.entities.len(), 1);
    }
}
