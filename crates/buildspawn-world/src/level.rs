use buildspawn_core::block::BlockKind;
use buildspawn_core::constants::{WORLD_MAX_Y, WORLD_MIN_Y};
use buildspawn_core::rule::Biome;
use buildspawn_core::types::{BlockPos, ChunkPos};

/// Read-only view of the host world.
///
/// `is_chunk_loaded` must be a cheap lookup that never loads or generates a
/// chunk; every other method is only called for positions in loaded chunks.
pub trait LevelAccess {
    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool;
    fn block_kind(&self, pos: BlockPos) -> BlockKind;
    fn biome_at(&self, pos: BlockPos) -> Biome;

    fn min_y(&self) -> i32 {
        WORLD_MIN_Y
    }

    fn max_y(&self) -> i32 {
        WORLD_MAX_Y
    }
}
