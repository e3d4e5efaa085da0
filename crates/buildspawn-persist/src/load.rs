use buildspawn_core::types::ChunkPos;
use glam::IVec2;

use crate::chunk_data::ChunkSpawnData;
use crate::compress;
use crate::error::PersistError;
use crate::format::*;

/// Parsed region file.
pub struct RegionData {
    pub header: RegionHeader,
    pub chunks: Vec<(ChunkPos, ChunkSpawnData)>,
    /// Compatibility warnings and skipped entries.
    pub warnings: Vec<String>,
}

/// Magic and version must match; a different world seed only warns, since
/// recorded decisions stay valid while new chunks roll differently.
fn check_header(header: &RegionHeader, world_seed: u64) -> Result<Vec<String>, PersistError> {
    if header.magic != MAGIC {
        return Err(PersistError::InvalidMagic);
    }
    if header.version != FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion(header.version));
    }
    if header.world_seed == world_seed {
        return Ok(Vec::new());
    }
    let msg = format!(
        "region written for seed {:016x}, world seed is now {world_seed:016x}",
        header.world_seed
    );
    log::warn!("{msg}");
    Ok(vec![msg])
}

/// Load and parse a region file from raw bytes.
///
/// Header and table problems are fatal. A chunk whose block is out of range
/// or unreadable is skipped with a warning, so it counts as not processed.
pub fn load_region(bytes: &[u8], current_world_seed: u64) -> Result<RegionData, PersistError> {
    if bytes.len() < HEADER_SIZE {
        return Err(PersistError::FileTooSmall(bytes.len(), HEADER_SIZE));
    }

    let header: RegionHeader = bytemuck::pod_read_unaligned(&bytes[..HEADER_SIZE]);
    let mut warnings = check_header(&header, current_world_seed)?;

    let chunk_count = header.chunk_count as usize;
    let table_end = HEADER_SIZE + chunk_count * CHUNK_TABLE_ENTRY_SIZE;
    if bytes.len() < table_end {
        return Err(PersistError::TruncatedFile {
            expected: table_end,
            actual: bytes.len(),
        });
    }

    let mut chunks = Vec::with_capacity(chunk_count);
    for i in 0..chunk_count {
        let entry_start = HEADER_SIZE + i * CHUNK_TABLE_ENTRY_SIZE;
        let entry = &bytes[entry_start..entry_start + CHUNK_TABLE_ENTRY_SIZE];

        let cx = i32::from_le_bytes([entry[0], entry[1], entry[2], entry[3]]);
        let cz = i32::from_le_bytes([entry[4], entry[5], entry[6], entry[7]]);
        let mut offset_bytes = [0u8; 8];
        offset_bytes.copy_from_slice(&entry[8..16]);
        let offset = u64::from_le_bytes(offset_bytes) as usize;
        let size = u32::from_le_bytes([entry[16], entry[17], entry[18], entry[19]]) as usize;
        let pos = IVec2::new(cx, cz);

        let end = offset.saturating_add(size);
        if offset < table_end || end > bytes.len() {
            let msg = format!("chunk {pos}: block {offset}..{end} outside file, skipped");
            log::warn!("{msg}");
            warnings.push(msg);
            continue;
        }

        let decoded = compress::decompress_block(&bytes[offset..end]).and_then(|raw| {
            let text =
                String::from_utf8(raw).map_err(|e| PersistError::DecodeError(e.to_string()))?;
            ChunkSpawnData::try_decode(&text)
        });
        match decoded {
            Ok(data) => chunks.push((pos, data)),
            Err(e) => {
                let msg = format!("chunk {pos}: {e}, skipped");
                log::warn!("{msg}");
                warnings.push(msg);
            }
        }
    }

    Ok(RegionData {
        header,
        chunks,
        warnings,
    })
}
