use crate::constants::CHUNK_SIZE;
use crate::types::{BlockBox, BlockPos, ChunkPos};
use glam::{DVec3, IVec2, IVec3};

/// Convert a world-space block coordinate to its containing chunk column.
pub fn block_to_chunk(pos: BlockPos) -> ChunkPos {
    IVec2::new(pos.x.div_euclid(CHUNK_SIZE), pos.z.div_euclid(CHUNK_SIZE))
}

/// Convert an exact (entity) position to its containing chunk column.
pub fn position_to_chunk(pos: DVec3) -> ChunkPos {
    block_to_chunk(position_to_block(pos))
}

/// Floor an exact position to the block it is inside.
pub fn position_to_block(pos: DVec3) -> BlockPos {
    IVec3::new(
        pos.x.floor() as i32,
        pos.y.floor() as i32,
        pos.z.floor() as i32,
    )
}

/// Minimum block (x, z) of a chunk column at the given Y.
pub fn chunk_origin(chunk: ChunkPos, y: i32) -> BlockPos {
    IVec3::new(chunk.x * CHUNK_SIZE, y, chunk.y * CHUNK_SIZE)
}

/// Convert a chunk coordinate and local column offset back to world-space.
pub fn chunk_local_to_world(chunk: ChunkPos, local_x: i32, y: i32, local_z: i32) -> BlockPos {
    IVec3::new(
        chunk.x * CHUNK_SIZE + local_x,
        y,
        chunk.y * CHUNK_SIZE + local_z,
    )
}

/// Centre column of a chunk at the given Y.
pub fn chunk_center(chunk: ChunkPos, y: i32) -> BlockPos {
    chunk_local_to_world(chunk, CHUNK_SIZE / 2, y, CHUNK_SIZE / 2)
}

/// All chunk columns touched by a block box, row-major (x fastest).
pub fn chunks_in_box(bounds: &BlockBox) -> Vec<ChunkPos> {
    let lo = block_to_chunk(bounds.min);
    let hi = block_to_chunk(bounds.max);
    let mut chunks = Vec::with_capacity(((hi.x - lo.x + 1) * (hi.y - lo.y + 1)) as usize);
    for cz in lo.y..=hi.y {
        for cx in lo.x..=hi.x {
            chunks.push(IVec2::new(cx, cz));
        }
    }
    chunks
}

/// The 3×3 chunk neighborhood centred on `chunk`, centre first.
pub fn chunk_neighborhood(chunk: ChunkPos) -> [ChunkPos; 9] {
    let mut out = [chunk; 9];
    let mut i = 1;
    for dz in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dz == 0 {
                continue;
            }
            out[i] = chunk + IVec2::new(dx, dz);
            i += 1;
        }
    }
    out
}

/// Mix a world seed and a chunk position into a per-chunk RNG seed.
///
/// Stable across runs and platforms.
pub fn chunk_seed(world_seed: u64, chunk: ChunkPos) -> u64 {
    let mut state = world_seed
        ^ (chunk.x as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (chunk.y as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);

    state ^= state >> 33;
    state = state.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    state ^= state >> 33;
    state = state.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    state ^= state >> 33;
    state
}
