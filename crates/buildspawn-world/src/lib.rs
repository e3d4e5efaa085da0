pub mod level;
pub mod spawner;
pub mod store;
pub mod tracker;
pub mod validators;

#[cfg(test)]
pub(crate) mod testing;

pub use level::LevelAccess;
pub use spawner::{
    ChunkOutcome, ChunkSpawner, NoSpawnReason, PlacementError, PlacementRequest, StructurePlacer,
};
pub use store::{ChunkClaim, SpawnDataStore};
pub use tracker::{
    BuildingEvent, BuildingEventSink, BuildingTracker, CurrentBuilding, PlayerBuildingState,
    PlayerId,
};
pub use validators::{PositionValidator, SearchContext, SearchFailure, ValidatorRegistry};
