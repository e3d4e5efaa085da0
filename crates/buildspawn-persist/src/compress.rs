use crate::error::PersistError;
use crate::format::MAX_BLOCK_SIZE;

/// Compress a data block using LZ4 with the size prepended.
pub fn compress_block(data: &[u8]) -> Vec<u8> {
    lz4_flex::compress_prepend_size(data)
}

/// Decompress a size-prepended LZ4 block, refusing blocks over `MAX_BLOCK_SIZE`.
pub fn decompress_block(compressed: &[u8]) -> Result<Vec<u8>, PersistError> {
    if compressed.len() < 4 {
        return Err(PersistError::DecompressError(format!(
            "block of {} bytes has no size prefix",
            compressed.len()
        )));
    }
    let declared =
        u32::from_le_bytes([compressed[0], compressed[1], compressed[2], compressed[3]]) as usize;
    if declared > MAX_BLOCK_SIZE {
        return Err(PersistError::BlockTooLarge {
            size: declared,
            limit: MAX_BLOCK_SIZE,
        });
    }
    lz4_flex::decompress_size_prepended(compressed)
        .map_err(|e| PersistError::DecompressError(e.to_string()))
}
