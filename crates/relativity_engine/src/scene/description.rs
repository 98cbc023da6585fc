//! Serializable scene descriptions
//!
//! A description is plain data: groups of objects sharing a model and a
//! local-frame transform. [`instantiate`](super::instantiate) turns it into a
//! [`SceneRegistry`](super::SceneRegistry) by loading resources through a
//! backend.

use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::config::{load_data_file, ConfigError};

use crate::foundation::math::Vec3;
use crate::render::transform::LocalTransform;
use super::object::CustomParameters;

/// One object of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescription {
    /// Position at simulation time zero
    pub position: Vec3,
    /// Constant velocity
    #[serde(default = "Vec3::zeros")]
    pub velocity: Vec3,
    /// Shading pass-through parameters
    #[serde(default)]
    pub custom: CustomParameters,
}

impl ObjectDescription {
    /// Object at `position` moving with `velocity`, no custom data
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity, custom: CustomParameters::default() }
    }

    /// Builder-style custom parameters
    #[must_use]
    pub fn with_custom(mut self, custom: CustomParameters) -> Self {
        self.custom = custom;
        self
    }
}

/// Objects drawn with one model and one transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDescription {
    /// Group name
    pub name: String,
    /// Local-frame transform
    #[serde(default)]
    pub transform: LocalTransform,
    /// Model path
    pub model: String,
    /// Objects in draw order
    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
}

/// A complete scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Scenario name
    pub name: String,
    /// One-line summary shown at startup
    #[serde(default)]
    pub summary: String,
    /// Groups in draw order
    pub groups: Vec<GroupDescription>,
}

impl SceneDescription {
    /// Load a description from a TOML or RON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let description: Self = load_data_file(path)?;
        log::debug!("Scene description '{}' read from {}", description.name, path.display());
        Ok(description)
    }

    /// Total number of objects over all groups
    pub fn object_count(&self) -> usize {
        self.groups.iter().map(|group| group.objects.len()).sum()
    }
}
