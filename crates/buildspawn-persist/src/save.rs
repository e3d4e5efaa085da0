use buildspawn_core::types::ChunkPos;

use crate::chunk_data::ChunkSpawnData;
use crate::compress;
use crate::error::PersistError;
use crate::format::*;

/// Serialize chunk records into the region binary format.
///
/// Layout: header (24B) + chunk table (20B × N) + LZ4-compressed RON blocks.
pub fn save_region(
    chunks: &[(ChunkPos, ChunkSpawnData)],
    world_seed: u64,
) -> Result<Vec<u8>, PersistError> {
    let mut compressed_blocks: Vec<Vec<u8>> = Vec::with_capacity(chunks.len());
    for (_, data) in chunks {
        let text = data.encode()?;
        compressed_blocks.push(compress::compress_block(text.as_bytes()));
    }

    let table_size = chunks.len() * CHUNK_TABLE_ENTRY_SIZE;
    let data_start = HEADER_SIZE + table_size;

    let header = RegionHeader {
        magic: MAGIC,
        version: FORMAT_VERSION,
        _pad0: 0,
        world_seed,
        chunk_count: chunks.len() as u32,
        _pad1: 0,
    };

    let total_data_size: usize = compressed_blocks.iter().map(|b| b.len()).sum();
    let mut output = Vec::with_capacity(data_start + total_data_size);

    output.extend_from_slice(bytemuck::bytes_of(&header));

    let mut current_offset = data_start as u64;
    for ((pos, _), block) in chunks.iter().zip(&compressed_blocks) {
        let block_size = block.len() as u32;
        // Entry: cx:i32, cz:i32, offset:u64, size:u32 = 20 bytes
        output.extend_from_slice(&pos.x.to_le_bytes());
        output.extend_from_slice(&pos.y.to_le_bytes());
        output.extend_from_slice(&current_offset.to_le_bytes());
        output.extend_from_slice(&block_size.to_le_bytes());
        current_offset += u64::from(block_size);
    }

    for block in &compressed_blocks {
        output.extend_from_slice(block);
    }

    Ok(output)
}
