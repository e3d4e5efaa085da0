use buildspawn_core::rule::PositionType;
use rand::rngs::StdRng;

use super::{corners_of, sample_heights, Placement, PositionValidator, SearchContext};

/// Floats anywhere in range, clear of everything by the rule's margin.
pub struct OnAirValidator {
    /// Random heights tried per column.
    pub samples: usize,
}

impl Default for OnAirValidator {
    fn default() -> Self {
        Self { samples: 4 }
    }
}

impl PositionValidator for OnAirValidator {
    fn position_type(&self) -> PositionType {
        PositionType::OnAir
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
        let inflated = placement.bounds.inflate_xz(ctx.rule.margin.max(0));
        for y in [placement.bounds.min.y, placement.above_top()] {
            for corner in corners_of(&inflated, y) {
                if !ctx.kind(corner).is_air() {
                    return Err(format!("corner {corner} is not air"));
                }
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
    use glam::IVec3;

    #[test]
    fn test_sky_placement() {
        let level = GridLevel::land(64);
        let building = house(IVec3::new(5, 3, 5), IVec3::new(2, 0, 2));
        let rule = SpawnRule::new(PositionType::OnAir, 1.0, 120, 200);
        let ctx = context(&level, &building, &rule);

        let pos = OnAirValidator::default()
            .find_position(&ctx, &mut rng(5))
            .expect("open sky");
        let bounds = pos.world_bounds(&building);
        assert!(bounds.min.y >= 120);
        assert!(bounds.max.y <= 200);
    }

    #[test]
    fn test_underground_range_fails() {
        let level = GridLevel::land(64);
        let building = house(IVec3::new(5, 3, 5), IVec3::new(2, 0, 2));
        let rule = SpawnRule::new(PositionType::OnAir, 1.0, 0, 40);
        let ctx = context(&level, &building, &rule);

        let failure = OnAirValidator::default()
            .find_position_with_details(&ctx, &mut rng(5))
            .expect_err("solid ground everywhere");
        assert!(failure.candidates > 0);
        assert!(failure.reasons.iter().all(|r| r.contains("not air")));
    }

    #[test]
    fn test_margin_corners_checked() {
        let mut level = GridLevel::land(64);
        let building = house(IVec3::new(3, 3, 3), IVec3::new(1, 0, 1));
        let rule = SpawnRule::new(PositionType::OnAir, 1.0, 100, 200).with_margin(2);
        let placement = Placement::new(&building, IVec3::new(8, 150, 8), 0, Rotation::None);
        let ctx = context(&level, &building, &rule);
        assert!(OnAirValidator::default().validate(&ctx, &placement).is_ok());

        let inflated = placement.bounds.inflate_xz(2);
        level.set(corners_of(&inflated, placement.bounds.min.y)[0], BlockKind::Solid);
        let ctx = context(&level, &building, &rule);
        assert!(OnAirValidator::default().validate(&ctx, &placement).is_err());
    }
}
