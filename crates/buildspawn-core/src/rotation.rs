use glam::IVec3;

/// One of four discrete clockwise rotations about the Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Rotation {
    #[default]
    None = 0,
    Clockwise90 = 1,
    Clockwise180 = 2,
    Clockwise270 = 3,
}

/// All rotations in step order.
pub const ALL_ROTATIONS: [Rotation; 4] = [
    Rotation::None,
    Rotation::Clockwise90,
    Rotation::Clockwise180,
    Rotation::Clockwise270,
];

impl Rotation {
    /// Rotation from a step count; any integer wraps into 0..4.
    pub fn from_steps(steps: i32) -> Self {
        match steps.rem_euclid(4) {
            0 => Rotation::None,
            1 => Rotation::Clockwise90,
            2 => Rotation::Clockwise180,
            _ => Rotation::Clockwise270,
        }
    }

    /// Rotation nearest to an arbitrary angle in degrees.
    pub fn from_degrees(degrees: f64) -> Self {
        let wrapped = degrees.rem_euclid(360.0);
        Self::from_steps((wrapped / 90.0).round() as i32)
    }

    pub fn steps(self) -> i32 {
        self as i32
    }

    pub fn degrees(self) -> i32 {
        self.steps() * 90
    }

    #[must_use]
    pub fn inverse(self) -> Self {
        Self::from_steps(-self.steps())
    }

    /// Apply `other` after `self`.
    #[must_use]
    pub fn then(self, other: Rotation) -> Self {
        Self::from_steps(self.steps() + other.steps())
    }

    /// Rotate a horizontal offset. One clockwise step maps (x, z) to (-z, x).
    pub fn rotate_xz(self, x: i32, z: i32) -> (i32, i32) {
        match self {
            Rotation::None => (x, z),
            Rotation::Clockwise90 => (-z, x),
            Rotation::Clockwise180 => (-x, -z),
            Rotation::Clockwise270 => (z, -x),
        }
    }

    /// Rotate a block offset about the Y axis; Y is untouched.
    pub fn rotate_offset(self, offset: IVec3) -> IVec3 {
        let (x, z) = self.rotate_xz(offset.x, offset.z);
        IVec3::new(x, offset.y, z)
    }

    /// Rotate `point` about `pivot`.
    pub fn rotate_about(self, point: IVec3, pivot: IVec3) -> IVec3 {
        pivot + self.rotate_offset(point - pivot)
    }

    /// Rotate a yaw angle in degrees, wrapped to [0, 360).
    pub fn rotate_yaw(self, yaw: f32) -> f32 {
        (yaw + self.degrees() as f32).rem_euclid(360.0)
    }
}
