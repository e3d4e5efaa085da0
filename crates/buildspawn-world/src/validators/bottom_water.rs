use buildspawn_core::rule::PositionType;
use glam::IVec3;
use rand::rngs::StdRng;
use rand::Rng;

use super::{Placement, PositionValidator, SearchContext};

/// Rests on the floor of a body of water (sea bed, river bed, cave lake).
///
/// The anchor is a floor block; the block above it (the entrance) must be
/// water or underwater decoration, and so must the column above each corner
/// of the building top.
pub struct BottomWaterValidator;

impl PositionValidator for BottomWaterValidator {
    fn position_type(&self) -> PositionType {
        PositionType::BottomWater
    }

    /// Walks the column upward from the bottom of the range in random jumps.
    /// Landing in water snaps down to the floor beneath it; landing in floor
    /// climbs to the top of that floor layer. Candidates come out lowest
    /// first, so submerged caves are found as well as the sea bed.
    fn anchor_heights(
        &self,
        ctx: &SearchContext<'_>,
        x: i32,
        z: i32,
        lo: i32,
        hi: i32,
        rng: &mut StdRng,
    ) -> Vec<i32> {
        let kind_at = |y: i32| ctx.kind(IVec3::new(x, y, z));
        let max_jump = ctx.max_height_jump.max(1);
        let mut found = Vec::new();
        let mut y = lo;

        while y <= hi {
            let kind = kind_at(y);
            let anchor = if kind.is_water_like() {
                let mut bottom = y;
                while bottom > lo && kind_at(bottom - 1).is_water_like() {
                    bottom -= 1;
                }
                let floor = bottom - 1;
                (floor >= lo && kind_at(floor).is_floor()).then_some(floor)
            } else if kind.is_floor() {
                while y < hi && kind_at(y + 1).is_floor() {
                    y += 1;
                }
                Some(y)
            } else {
                None
            };
            if let Some(a) = anchor {
                if !found.contains(&a) {
                    found.push(a);
                }
            }
            y += rng.gen_range(1..=max_jump);
        }
        found
    }

    fn validate(&self, ctx: &SearchContext<'_>, placement: &Placement) -> Result<(), String> {
        if !ctx.kind(placement.anchor).is_floor() {
            return Err(format!("anchor {} is not floor", placement.anchor));
        }
        if !ctx.kind(placement.entrance).is_water_like() {
            return Err("no water above anchor".to_string());
        }
        for corner in placement.corners_at(placement.anchor.y) {
            if !ctx.kind(corner).is_floor() {
                return Err(format!("corner {corner} is not floor"));
            }
        }
        for corner in placement.corners_at(placement.above_top()) {
            if !ctx.kind(corner).is_water_like() {
                return Err(format!("no water above top at {corner}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, house, rng, GridLevel};
    use buildspawn_core::block::BlockKind;
    use buildspawn_core::rotation::Rotation;
    use buildspawn_core::rule::SpawnRule;

    #[test]
    fn test_sea_bed_placement() {
        let level = GridLevel::sea(40, 62);
        let building = house(IVec3::new(5, 4, 5), IVec3::new(2, 0, 0));
        let rule = SpawnRule::new(PositionType::BottomWater, 1.0, 0, 60);
        let ctx = context(&level, &building, &rule);

        let pos = BottomWaterValidator
            .find_position(&ctx, &mut rng(21))
            .expect("sea bed");
        assert_eq!(pos.origin.y, 41);
        assert_eq!(pos.entrance_world(&building).y, 41);
    }

    #[test]
    fn test_dry_floor_rejected_with_reason() {
        let level = GridLevel::land(40);
        let building = house(IVec3::new(5, 4, 5), IVec3::new(2, 0, 0));
        let rule = SpawnRule::new(PositionType::BottomWater, 1.0, 0, 60);
        let ctx = context(&level, &building, &rule);

        let failure = BottomWaterValidator
            .find_position_with_details(&ctx, &mut rng(21))
            .expect_err("no water anywhere");
        assert!(failure
            .reasons
            .iter()
            .any(|r| r.contains("no water above anchor")));
    }

    #[test]
    fn test_decoration_counts_as_water() {
        let mut level = GridLevel::sea(40, 62);
        let building = house(IVec3::new(3, 3, 3), IVec3::new(1, 0, 0));
        let rule = SpawnRule::new(PositionType::BottomWater, 1.0, 0, 60);
        let placement = Placement::new(&building, IVec3::new(8, 40, 8), 1, Rotation::None);
        level.set(placement.entrance, BlockKind::WaterDecoration);
        for corner in placement.corners_at(placement.above_top()) {
            level.set(corner, BlockKind::WaterDecoration);
        }
        let ctx = context(&level, &building, &rule);
        assert!(BottomWaterValidator.validate(&ctx, &placement).is_ok());
    }

    #[test]
    fn test_shallow_water_rejected_at_top() {
        let level = GridLevel::sea(40, 42);
        let building = house(IVec3::new(3, 5, 3), IVec3::new(1, 0, 0));
        let rule = SpawnRule::new(PositionType::BottomWater, 1.0, 0, 60);
        let placement = Placement::new(&building, IVec3::new(8, 40, 8), 1, Rotation::None);
        let ctx = context(&level, &building, &rule);
        let err = BottomWaterValidator
            .validate(&ctx, &placement)
            .expect_err("building pokes out of the water");
        assert!(err.contains("no water above top"), "{err}");
    }

    #[test]
    fn test_finds_cave_lake_below_dry_surface() {
        let mut level = GridLevel::land(80);
        for x in -8..24 {
            for z in -8..24 {
                for y in 31..=40 {
                    level.set(IVec3::new(x, y, z), BlockKind::Water);
                }
            }
        }
        let building = house(IVec3::new(3, 2, 3), IVec3::new(1, 0, 0));
        let rule = SpawnRule::new(PositionType::BottomWater, 1.0, 0, 75).with_margin(0);
        let ctx = context(&level, &building, &rule);

        let pos = BottomWaterValidator
            .find_position(&ctx, &mut rng(8))
            .expect("cave lake");
        assert_eq!(pos.origin.y, 31);
    }

    #[test]
    fn test_walk_snaps_down_through_water() {
        let level = GridLevel::sea(10, 50);
        let building = house(IVec3::new(3, 3, 3), IVec3::new(1, 0, 0));
        let rule = SpawnRule::new(PositionType::BottomWater, 1.0, 0, 60);
        let ctx = context(&level, &building, &rule);
        let heights = BottomWaterValidator.anchor_heights(&ctx, 3, 3, 0, 58, &mut rng(1));
        assert_eq!(heights, vec![10]);
    }
}
