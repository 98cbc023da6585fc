//! Scene objects and their pass-through shading parameters

use serde::{Serialize, Deserialize};

use crate::foundation::math::{Vec3, Vec4};
use crate::physics::Worldline;
use super::registry::{ModelId, ShaderGroupId};

/// Four opaque vectors handed unchanged to the shading stage
///
/// Their meaning is defined by the group's
/// [`LocalTransform`](crate::render::transform::LocalTransform).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomParameters(pub [Vec4; 4]);

impl CustomParameters {
    /// Create from all four vectors
    pub fn new(vectors: [Vec4; 4]) -> Self {
        Self(vectors)
    }

    /// First vector set, the rest zero
    pub fn from_first(first: Vec4) -> Self {
        Self([first, Vec4::zeros(), Vec4::zeros(), Vec4::zeros()])
    }

    /// First two vectors set, the rest zero
    pub fn from_pair(first: Vec4, second: Vec4) -> Self {
        Self([first, second, Vec4::zeros(), Vec4::zeros()])
    }

    /// Vector `index`, zero when out of range
    pub fn get(&self, index: usize) -> Vec4 {
        self.0.get(index).copied().unwrap_or_else(Vec4::zeros)
    }

    /// All four vectors
    pub fn as_array(&self) -> &[Vec4; 4] {
        &self.0
    }
}

impl Default for CustomParameters {
    fn default() -> Self {
        Self([Vec4::zeros(); 4])
    }
}

/// One object moving at constant velocity in the observer's rest frame
///
/// Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Position at simulation time zero
    pub initial_position: Vec3,
    /// Constant velocity, strictly below the propagation speed
    pub velocity: Vec3,
    /// Shading pass-through parameters
    pub custom: CustomParameters,
    /// Model drawn for this object
    pub model: ModelId,
    /// Shader group the object is drawn with
    pub group: ShaderGroupId,
}

impl SceneObject {
    /// The object's worldline
    pub fn worldline(&self) -> Worldline {
        Worldline::new(self.initial_position, self.velocity)
    }

    /// True position at simulation time `time`
    pub fn position_at(&self, time: f32) -> Vec3 {
        self.initial_position + self.velocity * time
    }
}
