use glam::IVec3;

use crate::building::Entrance;
use crate::rotation::Rotation;
use crate::types::{BlockBox, BlockPos};

/// Rotated world-space geometry of a building.
///
/// Everything rotates about the entrance anchor, so the entrance world
/// position is the same for all four rotations. Integer exact.
pub struct BoundsCalculator;

impl BoundsCalculator {
    /// Rotation that turns a building facing `entrance_yaw` towards
    /// `target_yaw`, rounded to the nearest quarter turn.
    pub fn rotation_for_yaw(entrance_yaw: f32, target_yaw: f32) -> Rotation {
        Rotation::from_degrees(f64::from(target_yaw) - f64::from(entrance_yaw))
    }

    /// Origin that puts the entrance at `entrance_world`.
    pub fn placement_origin(entrance: &Entrance, entrance_world: BlockPos) -> BlockPos {
        entrance_world - entrance.pos
    }

    /// Local block offset to world position.
    pub fn local_to_world(
        entrance: &Entrance,
        origin: BlockPos,
        rotation: Rotation,
        local: IVec3,
    ) -> BlockPos {
        origin + rotation.rotate_about(local, entrance.pos)
    }

    /// World position back to the local block offset.
    pub fn world_to_local(
        entrance: &Entrance,
        origin: BlockPos,
        rotation: Rotation,
        world: BlockPos,
    ) -> IVec3 {
        rotation.inverse().rotate_about(world - origin, entrance.pos)
    }

    /// The four footprint corners at the origin's Y.
    pub fn footprint_corners(
        size: IVec3,
        entrance: &Entrance,
        origin: BlockPos,
        rotation: Rotation,
    ) -> [BlockPos; 4] {
        let hi = size - IVec3::ONE;
        [
            IVec3::new(0, 0, 0),
            IVec3::new(hi.x, 0, 0),
            IVec3::new(0, 0, hi.z),
            IVec3::new(hi.x, 0, hi.z),
        ]
        .map(|c| Self::local_to_world(entrance, origin, rotation, c))
    }

    /// Inclusive world box of the rotated building.
    pub fn bounds_from_origin(
        size: IVec3,
        entrance: &Entrance,
        origin: BlockPos,
        rotation: Rotation,
    ) -> BlockBox {
        let corners = Self::footprint_corners(size, entrance, origin, rotation);
        let (min, max) = corners[1..]
            .iter()
            .fold((corners[0], corners[0]), |(lo, hi), c| (lo.min(*c), hi.max(*c)));
        BlockBox {
            min: IVec3::new(min.x, origin.y, min.z),
            max: IVec3::new(max.x, origin.y + size.y - 1, max.z),
        }
    }

    /// Box for a building whose entrance lands at `entrance_world`.
    pub fn bounds_at_entrance(
        size: IVec3,
        entrance: &Entrance,
        entrance_world: BlockPos,
        rotation: Rotation,
    ) -> BlockBox {
        let origin = Self::placement_origin(entrance, entrance_world);
        Self::bounds_from_origin(size, entrance, origin, rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::ALL_ROTATIONS;

    fn entrance() -> Entrance {
        Entrance {
            pos: IVec3::new(2, 1, 0),
            yaw: 180.0,
        }
    }

    #[test]
    fn test_rotation_for_yaw() {
        assert_eq!(BoundsCalculator::rotation_for_yaw(180.0, 180.0), Rotation::None);
        assert_eq!(
            BoundsCalculator::rotation_for_yaw(180.0, 270.0),
            Rotation::Clockwise90
        );
        assert_eq!(
            BoundsCalculator::rotation_for_yaw(180.0, 0.0),
            Rotation::Clockwise180
        );
        assert_eq!(
            BoundsCalculator::rotation_for_yaw(180.0, 90.0),
            Rotation::Clockwise270
        );
        assert_eq!(
            BoundsCalculator::rotation_for_yaw(0.0, 100.0),
            Rotation::Clockwise90
        );
    }

    #[test]
    fn test_unrotated_bounds() {
        let size = IVec3::new(5, 4, 3);
        let b = BoundsCalculator::bounds_from_origin(
            size,
            &entrance(),
            IVec3::new(100, 64, -20),
            Rotation::None,
        );
        assert_eq!(b.min, IVec3::new(100, 64, -20));
        assert_eq!(b.max, IVec3::new(104, 67, -18));
        assert_eq!(b.size(), size);
    }

    #[test]
    fn test_quarter_turn_swaps_footprint() {
        let size = IVec3::new(5, 4, 3);
        for rot in [Rotation::Clockwise90, Rotation::Clockwise270] {
            let b = BoundsCalculator::bounds_from_origin(size, &entrance(), IVec3::ZERO, rot);
            assert_eq!(b.size(), IVec3::new(3, 4, 5), "{rot:?}");
        }
    }

    #[test]
    fn test_entrance_fixed_under_rotation() {
        let size = IVec3::new(7, 5, 9);
        let e = entrance();
        let world_entrance = IVec3::new(-31, 40, 18);
        for rot in ALL_ROTATIONS {
            let origin = BoundsCalculator::placement_origin(&e, world_entrance);
            assert_eq!(
                BoundsCalculator::local_to_world(&e, origin, rot, e.pos),
                world_entrance
            );
            let b = BoundsCalculator::bounds_at_entrance(size, &e, world_entrance, rot);
            assert!(b.contains(world_entrance), "{rot:?}");
            assert_eq!(b.min.y, origin.y);
        }
    }

    #[test]
    fn test_local_world_roundtrip_all_rotations() {
        let size = IVec3::new(6, 3, 4);
        let e = entrance();
        let origin = IVec3::new(13, 70, -5);
        for rot in ALL_ROTATIONS {
            let b = BoundsCalculator::bounds_from_origin(size, &e, origin, rot);
            for x in 0..size.x {
                for y in 0..size.y {
                    for z in 0..size.z {
                        let local = IVec3::new(x, y, z);
                        let world = BoundsCalculator::local_to_world(&e, origin, rot, local);
                        assert!(b.contains(world), "{rot:?} {local}");
                        assert_eq!(
                            BoundsCalculator::world_to_local(&e, origin, rot, world),
                            local
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_footprint_corners_inside_bounds() {
        let size = IVec3::new(4, 2, 6);
        let origin = IVec3::new(0, 10, 0);
        let corners =
            BoundsCalculator::footprint_corners(size, &entrance(), origin, Rotation::Clockwise180);
        let b =
            BoundsCalculator::bounds_from_origin(size, &entrance(), origin, Rotation::Clockwise180);
        for c in corners {
            assert!(b.contains(c));
            assert_eq!(c.y, 10);
        }
    }
}
