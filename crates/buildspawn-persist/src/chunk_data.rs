use buildspawn_core::building::SpawnableBuilding;
use buildspawn_core::constants::UNKNOWN_AUTHOR;
use buildspawn_core::rotation::Rotation;
use buildspawn_core::types::{Aabb, BlockBox};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::PersistError;

/// Current chunk record version.
pub const CHUNK_DATA_VERSION: u32 = 1;

/// What the pipeline decided for one chunk.
///
/// Once `processed` is true the chunk is never searched again. Every field is
/// optional on disk so older or partial records still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkSpawnData {
    pub version: u32,
    pub processed: bool,
    pub rdns: String,
    pub pk: i64,
    /// Clockwise quarter turns, 0..4.
    pub rotation: u8,
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
    /// Name and author at placement time, shown by the tracker.
    pub name: String,
    pub author: String,
}

impl ChunkSpawnData {
    /// Decided, nothing placed.
    pub fn processed_only() -> Self {
        Self {
            version: CHUNK_DATA_VERSION,
            processed: true,
            ..Default::default()
        }
    }

    /// Decided, `building` placed inside `bounds`.
    pub fn with_building(
        building: &SpawnableBuilding,
        rotation: Rotation,
        bounds: &BlockBox,
        lang: &str,
    ) -> Self {
        let aabb = bounds.to_aabb();
        Self {
            version: CHUNK_DATA_VERSION,
            processed: true,
            rdns: building.rdns.clone(),
            pk: building.pk,
            rotation: rotation.steps() as u8,
            min_x: aabb.min.x,
            min_y: aabb.min.y,
            min_z: aabb.min.z,
            max_x: aabb.max.x,
            max_y: aabb.max.y,
            max_z: aabb.max.z,
            name: building.display_name(lang).to_string(),
            author: building.author.clone(),
        }
    }

    pub fn has_building(&self) -> bool {
        self.processed && !self.rdns.is_empty()
    }

    pub fn rotation(&self) -> Rotation {
        Rotation::from_steps(i32::from(self.rotation))
    }

    /// World box of the placed building, None without one or when degenerate.
    pub fn bounds(&self) -> Option<Aabb> {
        if !self.has_building() {
            return None;
        }
        let aabb = Aabb::new(
            DVec3::new(self.min_x, self.min_y, self.min_z),
            DVec3::new(self.max_x, self.max_y, self.max_z),
        );
        (!aabb.is_empty()).then_some(aabb)
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.rdns
        } else {
            &self.name
        }
    }

    pub fn display_author(&self) -> &str {
        if self.author.is_empty() {
            UNKNOWN_AUTHOR
        } else {
            &self.author
        }
    }

    pub fn encode(&self) -> Result<String, PersistError> {
        ron::to_string(self).map_err(|e| PersistError::EncodeError(e.to_string()))
    }

    pub fn try_decode(text: &str) -> Result<Self, PersistError> {
        let options = ron::Options::default();
        options
            .from_str(text)
            .map_err(|e| PersistError::DecodeError(e.to_string()))
    }

    /// Decode, treating malformed data as "not processed" so the chunk is
    /// evaluated again.
    pub fn decode_or_default(text: &str) -> Self {
        match Self::try_decode(text) {
            Ok(data) => {
                if data.version > CHUNK_DATA_VERSION {
                    log::warn!(
                        "Chunk spawn data version {} is newer than supported {}",
                        data.version,
                        CHUNK_DATA_VERSION
                    );
                }
                data
            }
            Err(e) => {
                log::warn!("Discarding unreadable chunk spawn data: {e}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildspawn_core::building::Entrance;
    use glam::IVec3;

    fn building() -> SpawnableBuilding {
        SpawnableBuilding::new(
            "com.example.shrine",
            12,
            IVec3::new(5, 5, 5),
            Entrance {
                pos: IVec3::new(2, 1, 0),
                yaw: 180.0,
            },
        )
        .with_name("en_us", "Shrine")
    }

    #[test]
    fn test_processed_only() {
        let data = ChunkSpawnData::processed_only();
        assert!(data.processed);
        assert!(!data.has_building());
        assert!(data.bounds().is_none());
    }

    #[test]
    fn test_with_building_bounds() {
        let bounds = BlockBox::from_corners(IVec3::new(10, 40, -4), IVec3::new(14, 44, 0));
        let data =
            ChunkSpawnData::with_building(&building(), Rotation::Clockwise90, &bounds, "en_us");
        assert!(data.has_building());
        assert_eq!(data.rotation(), Rotation::Clockwise90);
        let aabb = data.bounds().expect("bounds");
        assert_eq!(aabb.min, DVec3::new(10.0, 40.0, -4.0));
        assert_eq!(aabb.max, DVec3::new(15.0, 45.0, 1.0));
        assert!(aabb.contains(DVec3::new(14.9, 44.5, 0.5)));
        assert_eq!(data.display_name(), "Shrine");
        assert_eq!(data.display_author(), "unknown");
    }

    #[test]
    fn test_encode_decode() {
        let bounds = BlockBox::from_corners(IVec3::ZERO, IVec3::new(4, 4, 4));
        let data =
            ChunkSpawnData::with_building(&building(), Rotation::Clockwise180, &bounds, "en_us");
        let text = data.encode().expect("encode");
        assert_eq!(ChunkSpawnData::decode_or_default(&text), data);
    }

    #[test]
    fn test_missing_fields_default() {
        let data = ChunkSpawnData::try_decode("(processed: true)").expect("decode");
        assert!(data.processed);
        assert_eq!(data.version, 0);
        assert!(data.rdns.is_empty());
    }

    #[test]
    fn test_malformed_defaults_to_unprocessed() {
        let data = ChunkSpawnData::decode_or_default("(processed: tru");
        assert_eq!(data, ChunkSpawnData::default());
        assert!(!data.processed);
    }

    #[test]
    fn test_degenerate_box_has_no_bounds() {
        let data = ChunkSpawnData {
            processed: true,
            rdns: "x.y".into(),
            ..Default::default()
        };
        assert!(data.has_building());
        assert!(data.bounds().is_none());
        assert_eq!(data.display_name(), "x.y");
    }
}
