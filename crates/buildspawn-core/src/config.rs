use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::*;

/// Runtime configuration for the spawn pipeline. Every field has a default,
/// so a partial (or empty) config file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Seed mixed into every per-chunk RNG.
    pub world_seed: u64,
    /// Maximum building constructions held in memory.
    pub cache_max_entries: usize,
    /// Margin used for manual placements and rules without one.
    pub default_margin: i32,
    pub tracker_interval_ticks: u64,
    pub max_failure_reasons: usize,
    /// Columns sampled per chunk quadrant (1..=64).
    pub columns_per_quadrant: usize,
    /// Largest random step of the bottom-water column walk.
    pub max_height_jump: i32,
    /// Directory of the on-disk construction store; None keeps everything in memory.
    pub cache_dir: Option<PathBuf>,
    /// Catalog snapshot path.
    pub catalog_path: Option<PathBuf>,
    /// Preferred language for building names.
    pub language: String,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            world_seed: 0,
            cache_max_entries: DEFAULT_CACHE_ENTRIES,
            default_margin: DEFAULT_SAFETY_MARGIN,
            tracker_interval_ticks: TRACKER_INTERVAL_TICKS,
            max_failure_reasons: MAX_FAILURE_REASONS,
            columns_per_quadrant: COLUMNS_PER_QUADRANT,
            max_height_jump: MAX_HEIGHT_JUMP,
            cache_dir: None,
            catalog_path: None,
            language: FALLBACK_LANGUAGE.to_string(),
        }
    }
}

impl SpawnerConfig {
    /// Clamp out-of-range values back into their usable ranges.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.cache_max_entries = self.cache_max_entries.max(1);
        self.columns_per_quadrant = self.columns_per_quadrant.clamp(1, COLUMNS_PER_QUADRANT);
        self.max_height_jump = self.max_height_jump.max(1);
        self.tracker_interval_ticks = self.tracker_interval_ticks.max(1);
        self.default_margin = self.default_margin.max(0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let cfg = SpawnerConfig::default();
        assert_eq!(cfg.columns_per_quadrant, 64);
        assert_eq!(cfg.tracker_interval_ticks, 20);
        assert_eq!(cfg.default_margin, 5);
        assert!(cfg.cache_dir.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: SpawnerConfig =
            serde_json::from_str(r#"{"world_seed": 9, "cache_max_entries": 4}"#).expect("parse");
        assert_eq!(cfg.world_seed, 9);
        assert_eq!(cfg.cache_max_entries, 4);
        assert_eq!(cfg.max_height_jump, MAX_HEIGHT_JUMP);
    }

    #[test]
    fn test_sanitized_clamps() {
        let cfg = SpawnerConfig {
            cache_max_entries: 0,
            columns_per_quadrant: 500,
            max_height_jump: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(cfg.cache_max_entries, 1);
        assert_eq!(cfg.columns_per_quadrant, COLUMNS_PER_QUADRANT);
        assert_eq!(cfg.max_height_jump, 1);
    }
}
