//! Single source of truth for shared constants.
//! Config values in `SpawnerConfig` default to these.

/// Side length of a chunk column in blocks (X and Z).
pub const CHUNK_SIZE: i32 = 16;

/// Side length of one chunk quadrant used for candidate sampling.
pub const QUADRANT_SIZE: i32 = CHUNK_SIZE / 2;

/// Number of columns in one quadrant.
pub const COLUMNS_PER_QUADRANT: usize = (QUADRANT_SIZE * QUADRANT_SIZE) as usize;

/// Default number of blocks kept clear around a building footprint.
pub const DEFAULT_SAFETY_MARGIN: i32 = 5;

/// Host ticks per second.
pub const TICKS_PER_SECOND: u64 = 20;

/// Proximity tracker interval in ticks (once per second).
pub const TRACKER_INTERVAL_TICKS: u64 = TICKS_PER_SECOND;

/// Maximum number of failure reasons kept per position search.
pub const MAX_FAILURE_REASONS: usize = 64;

/// Default number of building constructions held in memory.
pub const DEFAULT_CACHE_ENTRIES: usize = 32;

/// Largest random step when walking a column upward looking for a stratum.
pub const MAX_HEIGHT_JUMP: i32 = 4;

/// Lowest buildable Y of the default overworld.
pub const WORLD_MIN_Y: i32 = -64;

/// Highest buildable Y of the default overworld.
pub const WORLD_MAX_Y: i32 = 319;

/// Language used when a requested translation is missing.
pub const FALLBACK_LANGUAGE: &str = "en_us";

/// Author shown when a chunk record has no author snapshot.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Y at which the biome of a chunk is sampled (chunk centre column).
pub const BIOME_SAMPLE_Y: i32 = 64;
