use crate::bounds::BoundsCalculator;
use crate::building::SpawnableBuilding;
use crate::rotation::Rotation;
use crate::rule::SpawnRule;
use crate::types::{BlockBox, BlockPos};

/// A validated placement: where the building's origin goes and how it is
/// rotated.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPosition {
    /// World position of the building origin (not the entrance).
    pub origin: BlockPos,
    pub rotation: Rotation,
    /// Rule that produced the position; None for manual placements.
    pub rule: Option<SpawnRule>,
}

impl SpawnPosition {
    pub fn new(origin: BlockPos, rotation: Rotation, rule: Option<SpawnRule>) -> Self {
        Self {
            origin,
            rotation,
            rule,
        }
    }

    /// Position that puts the entrance at `entrance_world`.
    pub fn at_entrance(
        building: &SpawnableBuilding,
        entrance_world: BlockPos,
        rotation: Rotation,
        rule: Option<SpawnRule>,
    ) -> Self {
        let origin = BoundsCalculator::placement_origin(&building.entrance, entrance_world);
        Self::new(origin, rotation, rule)
    }

    pub fn entrance_world(&self, building: &SpawnableBuilding) -> BlockPos {
        self.origin + building.entrance.pos
    }

    pub fn world_bounds(&self, building: &SpawnableBuilding) -> BlockBox {
        BoundsCalculator::bounds_from_origin(
            building.size,
            &building.entrance,
            self.origin,
            self.rotation,
        )
    }

    pub fn is_manual(&self) -> bool {
        self.rule.is_none()
    }
}
