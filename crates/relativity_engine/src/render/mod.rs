//! Rendering-side abstractions
//!
//! The observer pose and everything the viewer hands to, or reads back from,
//! the shading stage. No graphics API is referenced here: concrete back-ends
//! implement [`backend::RenderBackend`].

pub mod backend;
pub mod camera;
pub mod capture;
pub mod indicator;
pub mod recording;
pub mod transform;
pub mod uniforms;

pub use backend::{
    BackendError, BackendResult, ModelHandle, ProgramHandle, ProgramKind, ProgramSource, RenderBackend, UniformValue,
};
pub use camera::{MovementDirection, ObserverPose};
pub use capture::{CaptureError, ScreenshotWriter};
pub use indicator::velocity_indicator_rotation;
pub use recording::{BackendCall, RecordingBackend};
pub use transform::{EncodedTransform, LocalTransform};
pub use uniforms::{FrameUniformBlock, ObjectUniformBlock};
