use glam::IVec3;
use thiserror::Error;

/// Structural problems with a building or rule definition.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("building size must be positive on every axis, got {0}")]
    InvalidSize(IVec3),

    #[error("entrance {entrance} lies outside building of size {size}")]
    EntranceOutsideBounds { entrance: IVec3, size: IVec3 },

    #[error("spawn chance {0} is outside [0, 1]")]
    InvalidChance(f64),

    #[error("y_min {y_min} is above y_max {y_max}")]
    InvalidYRange { y_min: i32, y_max: i32 },

    #[error("negative safety margin {0}")]
    NegativeMargin(i32),
}
