//! Debug markers for true and apparent positions
//!
//! Each object gets a coordinate-axes marker at where it *is* (`P0 + V·t`)
//! and, while light delay is simulated, an arrow at where it is *seen*,
//! pointing along its velocity. Transforms are observer-relative to match
//! the rotation-only view matrix.

use crate::foundation::math::{Vec3, Mat4};
use crate::render::indicator::velocity_indicator_rotation;

/// What a marker depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Coordinate axes at the true position
    Axes,
    /// Velocity arrow at the apparent position
    VelocityArrow,
}

/// One marker draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugMarker {
    /// Index of the object the marker belongs to
    pub object: usize,
    /// Marker type
    pub kind: MarkerKind,
    /// Observer-relative model matrix
    pub model: Mat4,
}

impl DebugMarker {
    /// Axes marker at an object's true position
    pub fn axes(object: usize, true_position: Vec3, observer: Vec3) -> Self {
        Self {
            object,
            kind: MarkerKind::Axes,
            model: Mat4::new_translation(&(true_position - observer)),
        }
    }

    /// Velocity arrow at an object's apparent position
    pub fn velocity_arrow(object: usize, apparent_position: Vec3, velocity: &Vec3, observer: Vec3) -> Self {
        Self {
            object,
            kind: MarkerKind::VelocityArrow,
            model: Mat4::new_translation(&(apparent_position - observer)) * velocity_indicator_rotation(velocity),
        }
    }

    /// Observer-relative position of the marker origin
    pub fn offset(&self) -> Vec3 {
        self.model.fixed_view::<3, 1>(0, 3).into_owned()
    }
}
