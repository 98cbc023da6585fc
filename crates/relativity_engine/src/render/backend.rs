//! Backend abstraction for the shading stage
//!
//! The viewer never talks to a graphics API directly. Everything it needs
//! from the outside world (model loading, program compilation, uniform
//! binding, drawing, text, framebuffer readback) goes through
//! [`RenderBackend`], so windowed, headless and recording back-ends are
//! interchangeable.

use crate::foundation::math::{Vec3, Vec4, Mat4};
use crate::ui::overlay::OverlaySlot;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a loaded model stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle(pub u64);

/// Handle to a compiled shading program stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Errors reported by a backend
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    /// A model file could not be loaded
    #[error("failed to load model '{path}': {reason}")]
    ModelLoad {
        /// Model path as requested
        path: String,
        /// Backend-specific cause
        reason: String,
    },

    /// A shading program failed to compile or link
    #[error("failed to compile program '{name}': {reason}")]
    ProgramCompile {
        /// Program name
        name: String,
        /// Compiler or linker log
        reason: String,
    },

    /// The overlay font could not be loaded
    #[error("failed to load font '{path}': {reason}")]
    FontLoad {
        /// Font path as requested
        path: String,
        /// Backend-specific cause
        reason: String,
    },

    /// A handle did not refer to a live resource
    #[error("unknown {kind} handle {id}")]
    UnknownHandle {
        /// Resource kind ("model" or "program")
        kind: &'static str,
        /// Raw handle value
        id: u64,
    },

    /// Framebuffer readback failed
    #[error("framebuffer readback failed: {0}")]
    Readback(String),
}

/// Which program family a [`ProgramSource`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Relativistic mapping with Doppler recoloring
    Relativistic,
    /// Plain transform used for debug markers
    Marker,
}

/// Everything a backend needs to build one shading program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    /// Human-readable program name, used in logs and errors
    pub name: String,
    /// Program family
    pub kind: ProgramKind,
    /// Local-frame transform expression spliced into the vertex stage
    pub custom_transform: Option<String>,
}

impl ProgramSource {
    /// Relativistic program without custom source
    pub fn relativistic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProgramKind::Relativistic,
            custom_transform: None,
        }
    }

    /// Marker program
    pub fn marker() -> Self {
        Self {
            name: "marker".to_string(),
            kind: ProgramKind::Marker,
            custom_transform: None,
        }
    }

    /// Builder-style custom transform expression
    #[must_use]
    pub fn with_custom_transform(mut self, expression: Option<String>) -> Self {
        self.custom_transform = expression;
        self
    }
}

/// Value written to a named uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Boolean flag
    Bool(bool),
    /// Signed integer
    Int(i32),
    /// Scalar
    Float(f32),
    /// Three-component vector
    Vec3(Vec3),
    /// Four-component vector
    Vec4(Vec4),
    /// 4x4 matrix
    Mat4(Mat4),
}

/// Collaborator interface consumed by the frame pipeline and the engine
pub trait RenderBackend {
    /// Load a model from disk
    fn load_model(&mut self, path: &str) -> BackendResult<ModelHandle>;

    /// Compile and link a shading program
    fn compile_program(&mut self, source: &ProgramSource) -> BackendResult<ProgramHandle>;

    /// Make `program` the target of subsequent uniforms and draws
    fn use_program(&mut self, program: ProgramHandle) -> BackendResult<()>;

    /// Write a named uniform of `program`; unknown names are ignored
    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue) -> BackendResult<()>;

    /// Upload a packed std140 block to the named binding of `program`
    ///
    /// Back-ends that bind every uniform by name can ignore the blocks.
    fn set_uniform_block(&mut self, _program: ProgramHandle, _binding: &str, _bytes: &[u8]) -> BackendResult<()> {
        Ok(())
    }

    /// Draw a model with `program`
    fn draw_model(&mut self, model: ModelHandle, program: ProgramHandle) -> BackendResult<()>;

    /// Draw the reference ground plane
    fn draw_ground_plane(&mut self, view_projection: &Mat4, observer: Vec3) -> BackendResult<()>;

    /// Clear the depth buffer so later draws land on top
    fn clear_depth(&mut self) -> BackendResult<()>;

    /// Load the overlay font
    fn load_font(&mut self, path: &str, pixel_size: u32) -> BackendResult<()>;

    /// Replace the text of one overlay slot
    fn set_overlay_text(&mut self, slot: OverlaySlot, text: &str) -> BackendResult<()>;

    /// Read the displayed framebuffer as tightly packed BGR bytes
    fn read_front_buffer(&mut self, width: u32, height: u32) -> BackendResult<Vec<u8>>;

    /// Present the finished frame
    fn present(&mut self) -> BackendResult<()>;
}
