//! Position search: one validator per `PositionType`, sharing the chunk
//! sampling and rotation loop through `find_position_with_details`.

mod bottom_water;
mod on_air;
mod on_ground;
mod on_water;
mod over_fluid;
mod under_ground;

pub use bottom_water::BottomWaterValidator;
pub use on_air::OnAirValidator;
pub use on_ground::OnGroundValidator;
pub use on_water::OnWaterValidator;
pub use over_fluid::{OverLavaValidator, OverWaterValidator};
pub use under_ground::UnderGroundValidator;

use buildspawn_core::block::BlockKind;
use buildspawn_core::bounds::BoundsCalculator;
use buildspawn_core::building::SpawnableBuilding;
use buildspawn_core::constants::{CHUNK_SIZE, QUADRANT_SIZE};
use buildspawn_core::math::{chunk_local_to_world, chunks_in_box};
use buildspawn_core::rotation::Rotation;
use buildspawn_core::rule::{PositionType, SpawnRule, ALL_POSITION_TYPES};
use buildspawn_core::spawn::SpawnPosition;
use buildspawn_core::types::{BlockBox, BlockPos, ChunkPos};
use glam::IVec3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

use crate::level::LevelAccess;

/// Everything a validator needs for one search.
pub struct SearchContext<'a> {
    pub level: &'a dyn LevelAccess,
    pub chunk: ChunkPos,
    pub building: &'a SpawnableBuilding,
    pub rule: &'a SpawnRule,
    pub columns_per_quadrant: usize,
    pub max_failure_reasons: usize,
    pub max_height_jump: i32,
}

impl SearchContext<'_> {
    pub fn kind(&self, pos: BlockPos) -> BlockKind {
        self.level.block_kind(pos)
    }

    /// Anchor Y range where the whole building fits inside both the rule's
    /// range and the world.
    pub fn anchor_range(&self, entrance_offset: i32) -> Option<(i32, i32)> {
        let b = self.building;
        let below = b.entrance.pos.y - entrance_offset;
        let above = entrance_offset + b.size.y - 1 - b.entrance.pos.y;
        let (lo, hi) = self.rule.usable_range(above)?;
        let lo = lo.max(self.level.min_y() + below);
        let hi = hi.min(self.level.max_y() - above - 1);
        (lo <= hi).then_some((lo, hi))
    }
}

/// One fully specified candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub anchor: BlockPos,
    pub entrance: BlockPos,
    pub origin: BlockPos,
    pub rotation: Rotation,
    pub bounds: BlockBox,
}

impl Placement {
    pub fn new(
        building: &SpawnableBuilding,
        anchor: BlockPos,
        entrance_offset: i32,
        rotation: Rotation,
    ) -> Self {
        let entrance = anchor + IVec3::new(0, entrance_offset, 0);
        let origin = BoundsCalculator::placement_origin(&building.entrance, entrance);
        let bounds = BoundsCalculator::bounds_from_origin(
            building.size,
            &building.entrance,
            origin,
            rotation,
        );
        Self {
            anchor,
            entrance,
            origin,
            rotation,
            bounds,
        }
    }

    /// Footprint corners (x, z) at height `y`.
    pub fn corners_at(&self, y: i32) -> [BlockPos; 4] {
        corners_of(&self.bounds, y)
    }

    /// One above the building top.
    pub fn above_top(&self) -> i32 {
        self.bounds.max.y + 1
    }
}

pub fn corners_of(bounds: &BlockBox, y: i32) -> [BlockPos; 4] {
    [
        IVec3::new(bounds.min.x, y, bounds.min.z),
        IVec3::new(bounds.max.x, y, bounds.min.z),
        IVec3::new(bounds.min.x, y, bounds.max.z),
        IVec3::new(bounds.max.x, y, bounds.max.z),
    ]
}

/// Why a search found nothing. Reasons beyond the cap are only counted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFailure {
    pub reasons: Vec<String>,
    pub dropped: usize,
    pub candidates: usize,
    cap: usize,
}

impl SearchFailure {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            ..Default::default()
        }
    }

    pub fn push(&mut self, reason: String) {
        if self.reasons.len() < self.cap {
            self.reasons.push(reason);
        } else {
            self.dropped += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.reasons.len() + self.dropped
    }

    pub fn summary(&self) -> String {
        match self.reasons.first() {
            Some(first) => format!(
                "{} candidates rejected ({} reasons, first: {first})",
                self.candidates,
                self.total()
            ),
            None => "no candidates".to_string(),
        }
    }
}

pub trait PositionValidator: Send + Sync {
    fn position_type(&self) -> PositionType;

    /// Entrance Y minus anchor Y.
    fn entrance_offset(&self) -> i32 {
        1
    }

    /// Candidate anchor heights for one world column, best first, all inside
    /// `[lo, hi]`.
    fn anchor_heights(
        &self,
        ctx: &SearchContext<'_>,
        x: i32,
        z: i32,
        lo: i32,
        hi: i32,
        rng: &mut StdRng,
    ) -> Vec<i32>;

    /// Block predicates for one candidate. Err carries the rejection reason.
    fn validate(&self, ctx: &SearchContext<'_>, placement: &Placement) -> Result<(), String>;

    /// Chunk-loaded guard, then `validate`. Never reads blocks of a
    /// candidate that touches an unloaded chunk.
    fn check_candidate(
        &self,
        ctx: &SearchContext<'_>,
        placement: &Placement,
    ) -> Result<(), String> {
        let guarded = placement.bounds.inflate_xz(ctx.rule.margin.max(0));
        for chunk in chunks_in_box(&guarded) {
            if !ctx.level.is_chunk_loaded(chunk) {
                return Err(format!("chunk {chunk} not loaded"));
            }
        }
        self.validate(ctx, placement)
    }

    /// Sample the chunk quadrant by quadrant and return the first candidate
    /// that passes `check_candidate`.
    fn find_position_with_details(
        &self,
        ctx: &SearchContext<'_>,
        rng: &mut StdRng,
    ) -> Result<SpawnPosition, SearchFailure> {
        let mut failure = SearchFailure::new(ctx.max_failure_reasons);
        if !ctx.level.is_chunk_loaded(ctx.chunk) {
            failure.push(format!("chunk {} not loaded", ctx.chunk));
            return Err(failure);
        }
        let offset = self.entrance_offset();
        let Some((lo, hi)) = ctx.anchor_range(offset) else {
            failure.push(format!(
                "{} does not fit Y range {}..={}",
                ctx.building.rdns, ctx.rule.y_min, ctx.rule.y_max
            ));
            return Err(failure);
        };

        let mut quadrants = [0, 1, 2, 3];
        quadrants.shuffle(rng);
        for quadrant in quadrants {
            for (lx, lz) in quadrant_columns(quadrant, ctx.columns_per_quadrant, rng) {
                let column = chunk_local_to_world(ctx.chunk, lx, 0, lz);
                for anchor_y in self.anchor_heights(ctx, column.x, column.z, lo, hi, rng) {
                    let anchor = IVec3::new(column.x, anchor_y, column.z);
                    let start = rng.gen_range(0..4);
                    for step in 0..4 {
                        let rotation = Rotation::from_steps(start + step);
                        let placement = Placement::new(ctx.building, anchor, offset, rotation);
                        failure.candidates += 1;
                        match self.check_candidate(ctx, &placement) {
                            Ok(()) => {
                                return Ok(SpawnPosition::new(
                                    placement.origin,
                                    rotation,
                                    Some(ctx.rule.clone()),
                                ))
                            }
                            Err(reason) => failure.push(format!("{anchor}: {reason}")),
                        }
                    }
                }
            }
        }
        Err(failure)
    }

    fn find_position(&self, ctx: &SearchContext<'_>, rng: &mut StdRng) -> Option<SpawnPosition> {
        self.find_position_with_details(ctx, rng).ok()
    }
}

/// Shuffled local columns of one 8×8 quadrant, at most `limit`.
fn quadrant_columns(quadrant: i32, limit: usize, rng: &mut StdRng) -> Vec<(i32, i32)> {
    let base_x = (quadrant % 2) * QUADRANT_SIZE;
    let base_z = (quadrant / 2) * QUADRANT_SIZE;
    let mut columns: Vec<(i32, i32)> = (0..QUADRANT_SIZE)
        .flat_map(|dz| (0..QUADRANT_SIZE).map(move |dx| (base_x + dx, base_z + dz)))
        .collect();
    columns.shuffle(rng);
    columns.truncate(limit);
    debug_assert!(columns
        .iter()
        .all(|(x, z)| (0..CHUNK_SIZE).contains(x) && (0..CHUNK_SIZE).contains(z)));
    columns
}

/// Up to `count` distinct random heights in `[lo, hi]`.
pub(crate) fn sample_heights(lo: i32, hi: i32, count: usize, rng: &mut StdRng) -> Vec<i32> {
    let span = (hi - lo + 1) as usize;
    if span <= count {
        let mut all: Vec<i32> = (lo..=hi).collect();
        all.shuffle(rng);
        return all;
    }
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let y = rng.gen_range(lo..=hi);
        if !out.contains(&y) {
            out.push(y);
        }
    }
    out
}

/// Topmost Y in `[lo, hi]` where `is_anchor` holds and the block above is open.
pub(crate) fn topmost_surface(
    ctx: &SearchContext<'_>,
    x: i32,
    z: i32,
    lo: i32,
    hi: i32,
    is_anchor: impl Fn(BlockKind) -> bool,
) -> Option<i32> {
    let mut above = ctx.kind(IVec3::new(x, hi + 1, z));
    for y in (lo..=hi).rev() {
        let here = ctx.kind(IVec3::new(x, y, z));
        if is_anchor(here) {
            return above.is_open().then_some(y);
        }
        above = here;
    }
    None
}

/// Maps each position type to its validator. Built once at startup.
pub struct ValidatorRegistry {
    validators: HashMap<PositionType, Box<dyn PositionValidator>>,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorRegistry {
    /// Registry with the built-in validator for every position type.
    pub fn new() -> Self {
        let mut registry = Self {
            validators: HashMap::new(),
        };
        registry.register(Box::new(OnGroundValidator));
        registry.register(Box::new(OnAirValidator::default()));
        registry.register(Box::new(OverWaterValidator));
        registry.register(Box::new(OverLavaValidator));
        registry.register(Box::new(OnWaterValidator));
        registry.register(Box::new(UnderGroundValidator::default()));
        registry.register(Box::new(BottomWaterValidator));
        debug_assert!(ALL_POSITION_TYPES
            .iter()
            .all(|pt| registry.validators.contains_key(pt)));
        registry
    }

    /// Replace the validator for its position type.
    pub fn register(&mut self, validator: Box<dyn PositionValidator>) {
        self.validators.insert(validator.position_type(), validator);
    }

    pub fn get(&self, position_type: PositionType) -> Option<&dyn PositionValidator> {
        self.validators.get(&position_type).map(|v| v.as_ref())
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}
