//! Local-frame vertex transforms
//!
//! Each shader group animates its vertices in the object's own rest frame
//! before the relativistic mapping is applied. The transform is described by
//! a tagged value instead of shader source: the shading stage receives a
//! kind code and two parameter vectors, and reads per-object data from the
//! object's custom parameters. Only [`LocalTransform::Custom`] carries source
//! text, which is handed to the program provider at compile time.
//!
//! Per-object layout (`custom[i]` are the object's four custom vectors):
//!
//! | kind | vertex position in the local frame |
//! |------|------------------------------------|
//! | `Identity` | `p` |
//! | `Offset` | `p + custom[0].xyz` |
//! | `AxisRotation` | `rotate(custom[0].xyz, custom[0].w·τ) · (scale·p) + custom[1].xyz` |
//! | `Oscillation` | `p + custom[0].xyz·sin(τ·custom[0].w) + custom[1].xyz` |
//! | `Scaled` | `factor·p + custom[0].xyz` |
//!
//! where `τ` is the object's local (proper) time.

use serde::{Serialize, Deserialize};

use crate::foundation::math::Vec4;

/// Local-frame transform applied by one shader group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocalTransform {
    /// Vertices are used as loaded
    #[default]
    Identity,
    /// Translate by `custom[0].xyz`
    Offset,
    /// Spin around `custom[0].xyz` at `custom[0].w` radians per unit of proper time
    AxisRotation {
        /// Uniform scale applied before rotating
        scale: f32,
    },
    /// Sinusoidal displacement along `custom[0].xyz` with angular frequency `custom[0].w`
    Oscillation,
    /// Uniform scale followed by a `custom[0].xyz` offset
    Scaled {
        /// Scale factor
        factor: f32,
    },
    /// Shading-language expression returning the local-frame position
    Custom {
        /// Expression source, spliced in by the program provider
        expression: String,
    },
}

/// Transform descriptor as pushed to the shading stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedTransform {
    /// Value of the `transform_kind` uniform
    pub kind: i32,
    /// Values of `transform_params[0]` and `transform_params[1]`
    pub params: [Vec4; 2],
}

impl LocalTransform {
    /// Kind code of [`LocalTransform::Identity`]
    pub const KIND_IDENTITY: i32 = 0;
    /// Kind code of [`LocalTransform::Offset`]
    pub const KIND_OFFSET: i32 = 1;
    /// Kind code of [`LocalTransform::AxisRotation`]
    pub const KIND_AXIS_ROTATION: i32 = 2;
    /// Kind code of [`LocalTransform::Oscillation`]
    pub const KIND_OSCILLATION: i32 = 3;
    /// Kind code of [`LocalTransform::Scaled`]
    pub const KIND_SCALED: i32 = 4;
    /// Kind code of [`LocalTransform::Custom`]
    pub const KIND_CUSTOM: i32 = 5;

    /// Structured uniform encoding of this transform
    pub fn encode(&self) -> EncodedTransform {
        let (kind, first) = match self {
            Self::Identity => (Self::KIND_IDENTITY, Vec4::zeros()),
            Self::Offset => (Self::KIND_OFFSET, Vec4::zeros()),
            Self::AxisRotation { scale } => (Self::KIND_AXIS_ROTATION, Vec4::new(*scale, 0.0, 0.0, 0.0)),
            Self::Oscillation => (Self::KIND_OSCILLATION, Vec4::zeros()),
            Self::Scaled { factor } => (Self::KIND_SCALED, Vec4::new(*factor, 0.0, 0.0, 0.0)),
            Self::Custom { .. } => (Self::KIND_CUSTOM, Vec4::zeros()),
        };

        EncodedTransform { kind, params: [first, Vec4::zeros()] }
    }

    /// Source text to splice into the program, only for custom transforms
    pub fn expression(&self) -> Option<&str> {
        match self {
            Self::Custom { expression } => Some(expression),
            _ => None,
        }
    }
}
