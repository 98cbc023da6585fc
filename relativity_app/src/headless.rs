//! Window-less backend
//!
//! Accepts every call, hands out sequential handles and logs what a real
//! renderer would have done. The framebuffer it reads back is black.

use std::collections::HashMap;

use relativity_engine::foundation::math::{Mat4, Vec3};
use relativity_engine::render::{BackendError, BackendResult, ModelHandle, ProgramHandle, ProgramSource, RenderBackend, UniformValue};
use relativity_engine::ui::OverlaySlot;

/// Logging backend for scripted sessions
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
    programs: HashMap<u64, String>,
    frame_draws: usize,
    frame_block_bytes: usize,
    frames: u64,
}

impl HeadlessBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames presented so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn allocate(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn check_program(&self, program: ProgramHandle) -> BackendResult<()> {
        if self.programs.contains_key(&program.0) {
            Ok(())
        } else {
            Err(BackendError::UnknownHandle { kind: "program", id: program.0 })
        }
    }
}

impl RenderBackend for HeadlessBackend {
    fn load_model(&mut self, path: &str) -> BackendResult<ModelHandle> {
        let handle = ModelHandle(self.allocate());
        log::debug!("Model {path} -> {handle:?}");
        Ok(handle)
    }

    fn compile_program(&mut self, source: &ProgramSource) -> BackendResult<ProgramHandle> {
        let handle = ProgramHandle(self.allocate());
        if let Some(expression) = &source.custom_transform {
            log::debug!("Program '{}' ({:?}) with custom transform `{expression}` -> {handle:?}", source.name, source.kind);
        } else {
            log::debug!("Program '{}' ({:?}) -> {handle:?}", source.name, source.kind);
        }
        self.programs.insert(handle.0, source.name.clone());
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) -> BackendResult<()> {
        self.check_program(program)
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue) -> BackendResult<()> {
        log::trace!("{:?}.{name} = {value:?}", program);
        Ok(())
    }

    fn set_uniform_block(&mut self, program: ProgramHandle, binding: &str, bytes: &[u8]) -> BackendResult<()> {
        self.check_program(program)?;
        log::trace!("{program:?}.{binding} <- {} bytes", bytes.len());
        self.frame_block_bytes += bytes.len();
        Ok(())
    }

    fn draw_model(&mut self, _model: ModelHandle, program: ProgramHandle) -> BackendResult<()> {
        self.check_program(program)?;
        self.frame_draws += 1;
        Ok(())
    }

    fn draw_ground_plane(&mut self, _view_projection: &Mat4, observer: Vec3) -> BackendResult<()> {
        log::trace!("Ground plane under {observer:?}");
        Ok(())
    }

    fn clear_depth(&mut self) -> BackendResult<()> {
        Ok(())
    }

    fn load_font(&mut self, path: &str, pixel_size: u32) -> BackendResult<()> {
        log::debug!("Font {path} at {pixel_size}px");
        Ok(())
    }

    fn set_overlay_text(&mut self, slot: OverlaySlot, text: &str) -> BackendResult<()> {
        log::trace!("Overlay {slot:?}: {text}");
        Ok(())
    }

    fn read_front_buffer(&mut self, width: u32, height: u32) -> BackendResult<Vec<u8>> {
        Ok(vec![0; width as usize * height as usize * 3])
    }

    fn present(&mut self) -> BackendResult<()> {
        self.frames += 1;
        log::trace!(
            "Frame {} presented with {} draws, {} uniform block bytes",
            self.frames,
            self.frame_draws,
            self.frame_block_bytes
        );
        self.frame_draws = 0;
        self.frame_block_bytes = 0;
        Ok(())
    }
}
