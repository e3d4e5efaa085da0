use buildspawn_core::block::BlockKind;
use buildspawn_core::rule::PositionType;
use rand::rngs::StdRng;

use super::{topmost_surface, Placement, PositionValidator, SearchContext};

/// Floats in the water surface layer; the entrance is level with the surface.
pub struct OnWaterValidator;

impl PositionValidator for OnWaterValidator {
    fn position_type(&self) -> PositionType {
        PositionType::OnWater
    }

    fn entrance_offset(&self) -> i32 {
        0
    }

    fn anchor_heights(
        &self,
        ctx: &SearchContext<'_>,
        x: i32,
        z: i32,
        lo: i32,
        hi: i32,
        _rng: &mut StdRng,
    ) -> Vec<i32> {
        topmost_surface(ctx, x, z, lo, hi, |k| k == BlockKind::Water)
            .into_iter()
            .collect()
    }

    fn validate(&self, ctx: &SearchContext<'_>, placement: &Placement) -> Result<(), String> {
        let anchor_y = placement.anchor.y;
        for corner in placement.corners_at(anchor_y) {
            if ctx.kind(corner) != BlockKind::Water {
                return Err(format!("no water at corner {corner}"));
            }
        }
        for y in anchor_y + 1..=placement.above_top() {
            for corner in placement.corners_at(y) {
                if !ctx.kind(corner).is_open() {
                    return Err(format!("corner {corner} is obstructed"));
                }
            }
        }
        Ok(())
    }
}
