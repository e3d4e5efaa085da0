use buildspawn_core::block::BlockKind;
use buildspawn_core::rule::PositionType;
use rand::rngs::StdRng;

use super::{topmost_surface, Placement, PositionValidator, SearchContext};

/// Rests on the topmost solid ground of a column, entrance one above.
pub struct OnGroundValidator;

impl PositionValidator for OnGroundValidator {
    fn position_type(&self) -> PositionType {
        PositionType::OnGround
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
        topmost_surface(ctx, x, z, lo, hi, BlockKind::is_solid)
            .into_iter()
            .collect()
    }

    fn validate(&self, ctx: &SearchContext<'_>, placement: &Placement) -> Result<(), String> {
        let anchor_y = placement.anchor.y;
        for corner in placement.corners_at(anchor_y) {
            if !ctx.kind(corner).is_solid() {
                return Err(format!("no ground under corner {corner}"));
            }
        }
        for y in [placement.entrance.y, placement.above_top()] {
            for corner in placement.corners_at(y) {
                if !ctx.kind(corner).is_open() {
                    return Err(format!("corner {corner} is obstructed"));
                }
            }
        }
        Ok(())
    }
}
