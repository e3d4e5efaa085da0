use glam::{DVec3, IVec2, IVec3};
use serde::{Deserialize, Serialize};

/// World coordinate in block-space.
pub type BlockPos = IVec3;

/// Chunk column coordinate (x, z), each unit = CHUNK_SIZE blocks.
pub type ChunkPos = IVec2;

/// Inclusive integer box in block-space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockBox {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl BlockBox {
    /// Build a box from two arbitrary corners.
    pub fn from_corners(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Size along each axis in blocks.
    pub fn size(&self) -> IVec3 {
        self.max - self.min + IVec3::ONE
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        pos.cmpge(self.min).all() && pos.cmple(self.max).all()
    }

    /// Grow horizontally by `margin` blocks on every side. Y is unchanged.
    pub fn inflate_xz(&self, margin: i32) -> Self {
        let m = IVec3::new(margin, 0, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    pub fn intersects(&self, other: &BlockBox) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Convert to a half-open double AABB covering the whole blocks.
    pub fn to_aabb(&self) -> Aabb {
        Aabb {
            min: self.min.as_dvec3(),
            max: (self.max + IVec3::ONE).as_dvec3(),
        }
    }
}

/// World-space axis-aligned box in doubles, half-open `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Whether an exact (entity) position lies inside this box.
    pub fn contains(&self, pos: DVec3) -> bool {
        pos.x >= self.min.x
            && pos.x < self.max.x
            && pos.y >= self.min.y
            && pos.y < self.max.y
            && pos.z >= self.min.z
            && pos.z < self.max.z
    }

    /// A box with no volume on some axis cannot contain anything.
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y || self.max.z <= self.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_box_from_corners_orders_axes() {
        let b = BlockBox::from_corners(IVec3::new(5, 1, -3), IVec3::new(-2, 4, 7));
        assert_eq!(b.min, IVec3::new(-2, 1, -3));
        assert_eq!(b.max, IVec3::new(5, 4, 7));
        assert_eq!(b.size(), IVec3::new(8, 4, 11));
    }

    #[test]
    fn test_block_box_to_aabb_is_half_open() {
        let b = BlockBox::from_corners(IVec3::new(0, 64, 0), IVec3::new(2, 66, 2));
        let aabb = b.to_aabb();
        assert!(aabb.contains(DVec3::new(2.9, 66.5, 0.0)));
        assert!(!aabb.contains(DVec3::new(3.0, 65.0, 1.0)));
        assert!(!aabb.contains(DVec3::new(1.0, 63.99, 1.0)));
    }

    #[test]
    fn test_inflate_xz_keeps_height() {
        let b = BlockBox::from_corners(IVec3::new(0, 0, 0), IVec3::new(3, 9, 3));
        let grown = b.inflate_xz(2);
        assert_eq!(grown.min, IVec3::new(-2, 0, -2));
        assert_eq!(grown.max, IVec3::new(5, 9, 5));
    }

    #[test]
    fn test_intersects() {
        let a = BlockBox::from_corners(IVec3::ZERO, IVec3::splat(4));
        let b = BlockBox::from_corners(IVec3::splat(4), IVec3::splat(8));
        let c = BlockBox::from_corners(IVec3::splat(5), IVec3::splat(8));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_empty_aabb() {
        assert!(Aabb::new(DVec3::ZERO, DVec3::ZERO).is_empty());
        assert!(!Aabb::new(DVec3::ZERO, DVec3::ONE).is_empty());
    }
}
