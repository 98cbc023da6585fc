//! In-memory backend that records every call
//!
//! Used by the pipeline and engine tests, and by tools that want to inspect
//! what a frame would submit without a GPU.

use std::collections::HashSet;

use super::backend::{
    BackendError, BackendResult, ModelHandle, ProgramHandle, ProgramSource, RenderBackend, UniformValue,
};
use crate::foundation::math::{Vec3, Mat4};
use crate::ui::overlay::OverlaySlot;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// `load_model`
    LoadModel(String),
    /// `compile_program`
    CompileProgram(ProgramSource),
    /// `use_program`
    UseProgram(ProgramHandle),
    /// `set_uniform`
    SetUniform(ProgramHandle, String, UniformValue),
    /// `set_uniform_block`, with the uploaded bytes
    SetUniformBlock(ProgramHandle, String, Vec<u8>),
    /// `draw_model`
    DrawModel(ModelHandle, ProgramHandle),
    /// `draw_ground_plane`
    DrawGroundPlane(Mat4, Vec3),
    /// `clear_depth`
    ClearDepth,
    /// `load_font`
    LoadFont(String, u32),
    /// `set_overlay_text`
    SetOverlayText(OverlaySlot, String),
    /// `read_front_buffer`
    ReadFrontBuffer(u32, u32),
    /// `present`
    Present,
}

/// Backend double that records calls and can be told to fail
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    next_handle: u64,
    failing_models: HashSet<String>,
    fail_font: bool,
    fail_readback: bool,
}

impl RecordingBackend {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `load_model` fail for `path`
    #[must_use]
    pub fn with_failing_model(mut self, path: impl Into<String>) -> Self {
        self.failing_models.insert(path.into());
        self
    }

    /// Make `load_font` fail
    #[must_use]
    pub fn with_failing_font(mut self) -> Self {
        self.fail_font = true;
        self
    }

    /// Make `read_front_buffer` fail
    #[must_use]
    pub fn with_failing_readback(mut self) -> Self {
        self.fail_readback = true;
        self
    }

    /// All calls so far, in order
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Forget recorded calls, keeping handles and failure settings
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Names of the uniforms written so far, in order
    pub fn uniform_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::SetUniform(_, name, _) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Last value written to `name`
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.calls.iter().rev().find_map(|call| match call {
            BackendCall::SetUniform(_, written, value) if written == name => Some(*value),
            _ => None,
        })
    }

    /// Bytes uploaded to `binding`, in order
    pub fn uniform_blocks(&self, binding: &str) -> Vec<&[u8]> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::SetUniformBlock(_, written, bytes) if written == binding => Some(bytes.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Number of model draws recorded
    pub fn draw_count(&self) -> usize {
        self.calls.iter().filter(|call| matches!(call, BackendCall::DrawModel(..))).count()
    }

    fn allocate(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RenderBackend for RecordingBackend {
    fn load_model(&mut self, path: &str) -> BackendResult<ModelHandle> {
        self.calls.push(BackendCall::LoadModel(path.to_string()));
        if self.failing_models.contains(path) {
            return Err(BackendError::ModelLoad {
                path: path.to_string(),
                reason: "file not found".to_string(),
            });
        }
        Ok(ModelHandle(self.allocate()))
    }

    fn compile_program(&mut self, source: &ProgramSource) -> BackendResult<ProgramHandle> {
        self.calls.push(BackendCall::CompileProgram(source.clone()));
        Ok(ProgramHandle(self.allocate()))
    }

    fn use_program(&mut self, program: ProgramHandle) -> BackendResult<()> {
        self.calls.push(BackendCall::UseProgram(program));
        Ok(())
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue) -> BackendResult<()> {
        self.calls.push(BackendCall::SetUniform(program, name.to_string(), value));
        Ok(())
    }

    fn set_uniform_block(&mut self, program: ProgramHandle, binding: &str, bytes: &[u8]) -> BackendResult<()> {
        self.calls.push(BackendCall::SetUniformBlock(program, binding.to_string(), bytes.to_vec()));
        Ok(())
    }

    fn draw_model(&mut self, model: ModelHandle, program: ProgramHandle) -> BackendResult<()> {
        self.calls.push(BackendCall::DrawModel(model, program));
        Ok(())
    }

    fn draw_ground_plane(&mut self, view_projection: &Mat4, observer: Vec3) -> BackendResult<()> {
        self.calls.push(BackendCall::DrawGroundPlane(*view_projection, observer));
        Ok(())
    }

    fn clear_depth(&mut self) -> BackendResult<()> {
        self.calls.push(BackendCall::ClearDepth);
        Ok(())
    }

    fn load_font(&mut self, path: &str, pixel_size: u32) -> BackendResult<()> {
        self.calls.push(BackendCall::LoadFont(path.to_string(), pixel_size));
        if self.fail_font {
            return Err(BackendError::FontLoad {
                path: path.to_string(),
                reason: "file not found".to_string(),
            });
        }
        Ok(())
    }

    fn set_overlay_text(&mut self, slot: OverlaySlot, text: &str) -> BackendResult<()> {
        self.calls.push(BackendCall::SetOverlayText(slot, text.to_string()));
        Ok(())
    }

    fn read_front_buffer(&mut self, width: u32, height: u32) -> BackendResult<Vec<u8>> {
        self.calls.push(BackendCall::ReadFrontBuffer(width, height));
        if self.fail_readback {
            return Err(BackendError::Readback("no framebuffer".to_string()));
        }
        let len = width as usize * height as usize * 3;
        Ok((0..len).map(|i| (i % 251) as u8).collect())
    }

    fn present(&mut self) -> BackendResult<()> {
        self.calls.push(BackendCall::Present);
        Ok(())
    }
}
