use buildspawn_core::rule::PositionType;
use glam::IVec3;
use rand::rngs::StdRng;

use super::{corners_of, sample_heights, Placement, PositionValidator, SearchContext};

/// Buried anywhere in range; the volume must be fully enclosed by solid blocks.
pub struct UnderGroundValidator {
    /// Random heights tried per column.
    pub samples: usize,
}

impl Default for UnderGroundValidator {
    fn default() -> Self {
        Self { samples: 4 }
    }
}

impl PositionValidator for UnderGroundValidator {
    fn position_type(&self) -> PositionType {
        PositionType::UnderGround
    }

    fn entrance_offset(&self) -> i32 {
        0
    }

    fn anchor_heights(
        &self,
        _ctx: &SearchContext<'_>,
        _x: i32,
        _z: i32,
        lo: i32,
        hi: i32,
        rng: &mut StdRng,
    ) -> Vec<i32> {
        sample_heights(lo, hi, self.samples, rng)
    }

    fn validate(&self, ctx: &SearchContext<'_>, placement: &Placement) -> Result<(), String> {
        let b = &placement.bounds;
        let centre = (b.min + b.max) / 2;
        let samples = corners_of(b, b.min.y)
            .into_iter()
            .chain(corners_of(b, b.max.y))
            .chain([centre, IVec3::new(centre.x, placement.above_top(), centre.z)]);
        for pos in samples {
            let kind = ctx.kind(pos);
            if !kind.is_solid() {
                return Err(format!("{kind:?} at {pos}"));
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
    fn test_buried_in_solid_ground() {
        let level = GridLevel::land(64);
        let building = house(IVec3::new(4, 3, 4), IVec3::new(2, 0, 0));
        let rule = SpawnRule::new(PositionType::UnderGround, 1.0, -40, 40);
        let ctx = context(&level, &building, &rule);

        let pos = UnderGroundValidator::default()
            .find_position(&ctx, &mut rng(11))
            .expect("solid rock");
        let bounds = pos.world_bounds(&building);
        assert!(bounds.min.y >= -40 && bounds.max.y <= 40);
    }

    #[test]
    fn test_open_sky_fails() {
        let level = GridLevel::land(64);
        let building = house(IVec3::new(4, 3, 4), IVec3::new(2, 0, 0));
        let rule = SpawnRule::new(PositionType::UnderGround, 1.0, 70, 150);
        let ctx = context(&level, &building, &rule);
        assert!(UnderGroundValidator::default()
            .find_position(&ctx, &mut rng(11))
            .is_none());
    }

    #[test]
    fn test_cave_in_centre_rejected() {
        let mut level = GridLevel::land(64);
        let building = house(IVec3::new(5, 5, 5), IVec3::new(2, 0, 0));
        let rule = SpawnRule::new(PositionType::UnderGround, 1.0, -40, 40);
        let placement = Placement::new(&building, IVec3::new(8, 0, 8), 0, Rotation::None);
        let ctx = context(&level, &building, &rule);
        assert!(UnderGroundValidator::default().validate(&ctx, &placement).is_ok());

        let centre = (placement.bounds.min + placement.bounds.max) / 2;
        level.set(centre, BlockKind::Air);
        let ctx = context(&level, &building, &rule);
        let err = UnderGroundValidator::default()
            .validate(&ctx, &placement)
            .expect_err("cave");
        assert!(err.starts_with("Air"), "{err}");
    }
}
