use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placement-relevant classification of a world block.
///
/// Validators only ever see this, never raw block ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockKind {
    Air,
    Water,
    Lava,
    /// Destroyable underwater decoration: coral, kelp, seagrass, bubble columns.
    WaterDecoration,
    /// Replaceable land vegetation and snow layers.
    Plant,
    /// Natural floor material (stone, dirt, sand, gravel, clay, mud, deepslate,
    /// prismarine, bedrock and their variants).
    Floor,
    /// Any other solid block.
    Solid,
}

impl BlockKind {
    pub fn is_air(self) -> bool {
        self == BlockKind::Air
    }

    /// Air or something a building may overwrite without looking out of place.
    pub fn is_open(self) -> bool {
        matches!(self, BlockKind::Air | BlockKind::Plant)
    }

    /// Water or ignorable underwater decoration.
    pub fn is_water_like(self) -> bool {
        matches!(self, BlockKind::Water | BlockKind::WaterDecoration)
    }

    pub fn is_fluid(self) -> bool {
        matches!(self, BlockKind::Water | BlockKind::Lava)
    }

    pub fn is_floor(self) -> bool {
        self == BlockKind::Floor
    }

    /// Anything a building can rest on.
    pub fn is_solid(self) -> bool {
        matches!(self, BlockKind::Floor | BlockKind::Solid)
    }
}

const AIR_BLOCKS: &[&str] = &["air", "cave_air", "void_air"];

const WATER_DECORATION_BLOCKS: &[&str] = &[
    "bubble_column",
    "kelp",
    "kelp_plant",
    "seagrass",
    "tall_seagrass",
    "sea_pickle",
];

const FLOOR_BLOCKS: &[&str] = &[
    "stone",
    "granite",
    "diorite",
    "andesite",
    "tuff",
    "calcite",
    "cobblestone",
    "mossy_cobblestone",
    "deepslate",
    "cobbled_deepslate",
    "dirt",
    "coarse_dirt",
    "rooted_dirt",
    "grass_block",
    "podzol",
    "mycelium",
    "sand",
    "red_sand",
    "suspicious_sand",
    "sandstone",
    "red_sandstone",
    "gravel",
    "suspicious_gravel",
    "clay",
    "mud",
    "packed_mud",
    "prismarine",
    "dark_prismarine",
    "prismarine_bricks",
    "bedrock",
];

const PLANT_BLOCKS: &[&str] = &[
    "short_grass",
    "grass",
    "tall_grass",
    "fern",
    "large_fern",
    "dead_bush",
    "snow",
    "vine",
    "dandelion",
    "poppy",
    "sweet_berry_bush",
];

/// Strip an optional `namespace:` prefix.
fn path_of(id: &str) -> &str {
    id.split_once(':').map_or(id, |(_, path)| path)
}

/// Classify a namespaced block id using the built-in tag tables.
pub fn classify_block_id(id: &str) -> BlockKind {
    let path = path_of(id);
    if AIR_BLOCKS.contains(&path) {
        BlockKind::Air
    } else if path == "water" {
        BlockKind::Water
    } else if path == "lava" {
        BlockKind::Lava
    } else if WATER_DECORATION_BLOCKS.contains(&path) || path.contains("coral") {
        BlockKind::WaterDecoration
    } else if FLOOR_BLOCKS.contains(&path) || path.ends_with("_ore") {
        BlockKind::Floor
    } else if PLANT_BLOCKS.contains(&path) || path.ends_with("_flower") || path.ends_with("_tulip")
    {
        BlockKind::Plant
    } else {
        BlockKind::Solid
    }
}

/// Block classifier with per-id overrides (e.g. modded blocks).
#[derive(Debug, Clone, Default)]
pub struct BlockClassifier {
    overrides: HashMap<String, BlockKind>,
}

impl BlockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(id, kind)` pairs; later pairs win.
    pub fn with_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, BlockKind)>,
    {
        Self {
            overrides: overrides.into_iter().collect(),
        }
    }

    pub fn classify(&self, id: &str) -> BlockKind {
        match self.overrides.get(id) {
            Some(kind) => *kind,
            None => classify_block_id(id),
        }
    }

    /// Number of override entries.
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_builtin_tables() {
        assert_eq!(classify_block_id("minecraft:air"), BlockKind::Air);
        assert_eq!(classify_block_id("minecraft:cave_air"), BlockKind::Air);
        assert_eq!(classify_block_id("minecraft:water"), BlockKind::Water);
        assert_eq!(classify_block_id("minecraft:lava"), BlockKind::Lava);
        assert_eq!(classify_block_id("minecraft:deepslate"), BlockKind::Floor);
        assert_eq!(classify_block_id("minecraft:iron_ore"), BlockKind::Floor);
        assert_eq!(classify_block_id("minecraft:oak_planks"), BlockKind::Solid);
        assert_eq!(classify_block_id("minecraft:short_grass"), BlockKind::Plant);
    }

    #[test]
    fn test_classify_underwater_decoration() {
        for id in [
            "minecraft:kelp_plant",
            "minecraft:seagrass",
            "minecraft:bubble_column",
            "minecraft:brain_coral_fan",
            "minecraft:tube_coral_block",
        ] {
            assert_eq!(classify_block_id(id), BlockKind::WaterDecoration, "{id}");
        }
    }

    #[test]
    fn test_classify_without_namespace() {
        assert_eq!(classify_block_id("sand"), BlockKind::Floor);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let classifier = BlockClassifier::with_overrides([(
            "mymod:glowing_sand".to_string(),
            BlockKind::Floor,
        )]);
        assert_eq!(classifier.classify("mymod:glowing_sand"), BlockKind::Floor);
        assert_eq!(classifier.classify("mymod:other"), BlockKind::Solid);
        assert_eq!(classifier.len(), 1);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(BlockKind::Plant.is_open());
        assert!(!BlockKind::Water.is_open());
        assert!(BlockKind::WaterDecoration.is_water_like());
        assert!(BlockKind::Floor.is_solid());
        assert!(!BlockKind::Lava.is_solid());
        assert!(BlockKind::Lava.is_fluid());
    }
}
