pub mod block;
pub mod bounds;
pub mod building;
pub mod config;
pub mod constants;
pub mod error;
pub mod math;
pub mod rotation;
pub mod rule;
pub mod spawn;
pub mod types;

pub use block::{BlockClassifier, BlockKind};
pub use bounds::BoundsCalculator;
pub use building::{BuildingConstruction, Entrance, SpawnableBuilding};
pub use config::SpawnerConfig;
pub use error::CoreError;
pub use rotation::Rotation;
pub use rule::{Biome, EnsureBoundsMode, PositionType, SpawnRule};
pub use spawn::SpawnPosition;
pub use types::{Aabb, BlockBox, BlockPos, ChunkPos};
