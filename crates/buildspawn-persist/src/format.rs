/// Magic bytes identifying a spawn-data region file.
pub const MAGIC: [u8; 4] = *b"BSPN";

/// Current region format version.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 24;

/// Size of each chunk table entry in bytes.
pub const CHUNK_TABLE_ENTRY_SIZE: usize = 20;

/// Largest decompressed block accepted when loading.
pub const MAX_BLOCK_SIZE: usize = 1 << 20;

/// Region file header. Fixed 24 bytes, repr(C) for byte-level serialization.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RegionHeader {
    pub magic: [u8; 4],
    pub version: u16,
    pub _pad0: u16,
    pub world_seed: u64,
    pub chunk_count: u32,
    pub _pad1: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(std::mem::size_of::<RegionHeader>(), HEADER_SIZE);
    }
}
