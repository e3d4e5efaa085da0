use buildspawn_core::block::BlockKind;
use buildspawn_core::rule::PositionType;
use rand::rngs::StdRng;

use super::{topmost_surface, Placement, PositionValidator, SearchContext};

fn fluid_surface(
    ctx: &SearchContext<'_>,
    fluid: BlockKind,
    x: i32,
    z: i32,
    lo: i32,
    hi: i32,
) -> Vec<i32> {
    topmost_surface(ctx, x, z, lo, hi, |k| k == fluid)
        .into_iter()
        .collect()
}

/// Fluid under every corner, open space at the entrance and above the top.
fn check_over_fluid(
    ctx: &SearchContext<'_>,
    fluid: BlockKind,
    placement: &Placement,
) -> Result<(), String> {
    for corner in placement.corners_at(placement.anchor.y) {
        let kind = ctx.kind(corner);
        if kind != fluid {
            return Err(format!("corner {corner} is {kind:?}, not {fluid:?}"));
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

/// Sits one block above a water surface (stilts, platforms).
pub struct OverWaterValidator;

impl PositionValidator for OverWaterValidator {
    fn position_type(&self) -> PositionType {
        PositionType::OverWater
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
        fluid_surface(ctx, BlockKind::Water, x, z, lo, hi)
    }

    fn validate(&self, ctx: &SearchContext<'_>, placement: &Placement) -> Result<(), String> {
        check_over_fluid(ctx, BlockKind::Water, placement)
    }
}

/// Sits one block above a lava surface.
pub struct OverLavaValidator;

impl PositionValidator for OverLavaValidator {
    fn position_type(&self) -> PositionType {
        PositionType::OverLava
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
        fluid_surface(ctx, BlockKind::Lava, x, z, lo, hi)
    }

    fn validate(&self, ctx: &SearchContext<'_>, placement: &Placement) -> Result<(), String> {
        check_over_fluid(ctx, BlockKind::Lava, placement)
    }
}
