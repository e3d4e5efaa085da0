use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SAFETY_MARGIN;
use crate::error::CoreError;
use crate::types::BlockBox;

/// Where, relative to the terrain, a building is allowed to sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionType {
    OnGround,
    OnAir,
    OverWater,
    OverLava,
    OnWater,
    UnderGround,
    BottomWater,
}

/// All position types, one validator each.
pub const ALL_POSITION_TYPES: [PositionType; 7] = [
    PositionType::OnGround,
    PositionType::OnAir,
    PositionType::OverWater,
    PositionType::OverLava,
    PositionType::OnWater,
    PositionType::UnderGround,
    PositionType::BottomWater,
];

impl PositionType {
    pub fn name(self) -> &'static str {
        match self {
            PositionType::OnGround => "ON_GROUND",
            PositionType::OnAir => "ON_AIR",
            PositionType::OverWater => "OVER_WATER",
            PositionType::OverLava => "OVER_LAVA",
            PositionType::OnWater => "ON_WATER",
            PositionType::UnderGround => "UNDER_GROUND",
            PositionType::BottomWater => "BOTTOM_WATER",
        }
    }
}

/// How aggressively existing blocks are cleared before placing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnsureBoundsMode {
    #[default]
    None,
    All,
    AboveEntrance,
}

impl EnsureBoundsMode {
    /// Region of `bounds` to clear, given the entrance world Y.
    pub fn clear_region(self, bounds: &BlockBox, entrance_y: i32) -> Option<BlockBox> {
        match self {
            EnsureBoundsMode::None => None,
            EnsureBoundsMode::All => Some(*bounds),
            EnsureBoundsMode::AboveEntrance => {
                if entrance_y > bounds.max.y {
                    return None;
                }
                let mut region = *bounds;
                region.min.y = entrance_y.max(bounds.min.y);
                Some(region)
            }
        }
    }
}

/// The biome at a position: registry id plus the tags it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Biome {
    pub id: String,
    pub tags: Vec<String>,
}

impl Biome {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    fn has_tag(&self, tag: &str) -> bool {
        let wanted = path_of(tag);
        self.tags.iter().any(|t| path_of(t) == wanted)
    }
}

fn path_of(id: &str) -> &str {
    id.split_once(':').map_or(id, |(_, path)| path)
}

/// Virtual aggregate biome tokens: (token, id keywords, tag).
const BIOME_AGGREGATES: &[(&str, &[&str], &str)] = &[
    ("ocean", &["ocean"], "is_ocean"),
    ("river", &["river"], "is_river"),
    ("beach", &["beach"], "is_beach"),
    ("forest", &["forest", "grove"], "is_forest"),
    ("mountain", &["peaks", "slopes", "hills"], "is_mountain"),
    ("overworld", &[], "is_overworld"),
    ("nether", &[], "is_nether"),
    ("end", &["the_end", "end_"], "is_end"),
];

/// Whether one biome token of a rule matches `biome`.
///
/// Tokens: `*`/`all`, `#tag`, an aggregate name, or an exact id
/// (namespace optional).
pub fn biome_token_matches(token: &str, biome: &Biome) -> bool {
    let token = token.trim();
    if token == "*" || token.eq_ignore_ascii_case("all") {
        return true;
    }
    if let Some(tag) = token.strip_prefix('#') {
        return biome.has_tag(tag);
    }
    if let Some((_, keywords, tag)) = BIOME_AGGREGATES
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(token))
    {
        let path = path_of(&biome.id);
        return biome.has_tag(tag) || keywords.iter().any(|k| path.contains(k));
    }
    token == biome.id || (!token.contains(':') && token == path_of(&biome.id))
}

fn default_margin() -> i32 {
    DEFAULT_SAFETY_MARGIN
}

/// One declarative placement rule for a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    /// Biome tokens; empty matches every biome.
    #[serde(default)]
    pub biomes: Vec<String>,
    /// Spawn probability per evaluated chunk (0.0–1.0).
    pub chance: f64,
    pub position_type: PositionType,
    /// Lowest allowed anchor Y (inclusive).
    pub y_min: i32,
    /// Highest allowed anchor Y (inclusive).
    pub y_max: i32,
    /// Blocks kept clear around the footprint.
    #[serde(default = "default_margin")]
    pub margin: i32,
    #[serde(default)]
    pub ensure_bounds: EnsureBoundsMode,
}

impl SpawnRule {
    pub fn new(position_type: PositionType, chance: f64, y_min: i32, y_max: i32) -> Self {
        Self {
            biomes: Vec::new(),
            chance,
            position_type,
            y_min,
            y_max,
            margin: DEFAULT_SAFETY_MARGIN,
            ensure_bounds: EnsureBoundsMode::None,
        }
    }

    #[must_use]
    pub fn with_biomes(mut self, biomes: &[&str]) -> Self {
        self.biomes = biomes.iter().map(|b| b.to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_margin(mut self, margin: i32) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn with_ensure_bounds(mut self, mode: EnsureBoundsMode) -> Self {
        self.ensure_bounds = mode;
        self
    }

    pub fn matches_biome(&self, biome: &Biome) -> bool {
        self.biomes.is_empty() || self.biomes.iter().any(|t| biome_token_matches(t, biome))
    }

    /// `sample` is uniform in [0, 1).
    pub fn passes_roll(&self, sample: f64) -> bool {
        sample < self.chance
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0.0..=1.0).contains(&self.chance) {
            return Err(CoreError::InvalidChance(self.chance));
        }
        if self.y_min > self.y_max {
            return Err(CoreError::InvalidYRange {
                y_min: self.y_min,
                y_max: self.y_max,
            });
        }
        if self.margin < 0 {
            return Err(CoreError::NegativeMargin(self.margin));
        }
        Ok(())
    }

    /// Y range narrowed so `height_above_anchor` blocks fit below `y_max`.
    /// None when nothing fits.
    pub fn usable_range(&self, height_above_anchor: i32) -> Option<(i32, i32)> {
        let top = self.y_max - height_above_anchor.max(0);
        (top >= self.y_min).then_some((self.y_min, top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    #[test]
    fn test_empty_biomes_match_everything() {
        let rule = SpawnRule::new(PositionType::OnGround, 0.5, 60, 120);
        assert!(rule.matches_biome(&Biome::new("minecraft:desert")));
    }

    #[test]
    fn test_biome_tokens() {
        let ocean = Biome::new("minecraft:deep_lukewarm_ocean").with_tags(&["minecraft:is_ocean"]);
        let plains = Biome::new("minecraft:plains").with_tags(&["minecraft:is_overworld"]);

        assert!(biome_token_matches("ocean", &ocean));
        assert!(biome_token_matches("#is_ocean", &ocean));
        assert!(biome_token_matches("#minecraft:is_ocean", &ocean));
        assert!(!biome_token_matches("ocean", &plains));
        assert!(biome_token_matches("minecraft:plains", &plains));
        assert!(biome_token_matches("plains", &plains));
        assert!(biome_token_matches("overworld", &plains));
        assert!(biome_token_matches("*", &plains));
        assert!(!biome_token_matches("othermod:plains", &plains));
    }

    #[test]
    fn test_rule_matches_any_token() {
        let rule = SpawnRule::new(PositionType::BottomWater, 1.0, -20, 60)
            .with_biomes(&["river", "ocean"]);
        assert!(rule.matches_biome(&Biome::new("minecraft:frozen_river")));
        assert!(!rule.matches_biome(&Biome::new("minecraft:savanna")));
    }

    #[test]
    fn test_usable_range_narrowing() {
        let rule = SpawnRule::new(PositionType::BottomWater, 1.0, 0, 10);
        assert_eq!(rule.usable_range(3), Some((0, 7)));
        assert_eq!(rule.usable_range(10), Some((0, 0)));
        assert_eq!(rule.usable_range(11), None);
    }

    #[test]
    fn test_passes_roll() {
        let rule = SpawnRule::new(PositionType::OnAir, 0.25, 0, 10);
        assert!(rule.passes_roll(0.1));
        assert!(!rule.passes_roll(0.25));
        let never = SpawnRule::new(PositionType::OnAir, 0.0, 0, 10);
        assert!(!never.passes_roll(0.0));
    }

    #[test]
    fn test_validate_rejects_bad_rules() {
        assert!(SpawnRule::new(PositionType::OnGround, 0.5, 0, 10).validate().is_ok());
        assert_eq!(
            SpawnRule::new(PositionType::OnGround, 1.5, 0, 10).validate(),
            Err(CoreError::InvalidChance(1.5))
        );
        assert!(matches!(
            SpawnRule::new(PositionType::OnGround, 0.5, 10, 0).validate(),
            Err(CoreError::InvalidYRange { .. })
        ));
        assert_eq!(
            SpawnRule::new(PositionType::OnGround, 0.5, 0, 10)
                .with_margin(-1)
                .validate(),
            Err(CoreError::NegativeMargin(-1))
        );
    }

    #[test]
    fn test_clear_region_modes() {
        let bounds = BlockBox::from_corners(IVec3::new(0, 10, 0), IVec3::new(4, 20, 4));
        assert_eq!(EnsureBoundsMode::None.clear_region(&bounds, 12), None);
        assert_eq!(EnsureBoundsMode::All.clear_region(&bounds, 12), Some(bounds));
        let above = EnsureBoundsMode::AboveEntrance
            .clear_region(&bounds, 12)
            .expect("region");
        assert_eq!(above.min.y, 12);
        assert_eq!(above.max.y, 20);
        assert_eq!(
            EnsureBoundsMode::AboveEntrance.clear_region(&bounds, 21),
            None
        );
    }

    #[test]
    fn test_rule_serde_defaults() {
        let json = r#"{"chance":0.5,"position_type":"BOTTOM_WATER","y_min":-10,"y_max":50}"#;
        let rule: SpawnRule = serde_json::from_str(json).expect("should parse");
        assert_eq!(rule.margin, DEFAULT_SAFETY_MARGIN);
        assert_eq!(rule.ensure_bounds, EnsureBoundsMode::None);
        assert!(rule.biomes.is_empty());
        assert_eq!(rule.position_type, PositionType::BottomWater);
    }
}
