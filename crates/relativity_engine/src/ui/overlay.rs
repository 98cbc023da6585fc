//! # Text Overlay
//!
//! Five fixed lines in the bottom-left corner showing the frame rate and the
//! observer's state. Each line reads `Label: value`. The overlay owns only
//! the strings; glyph drawing is the backend's job.

use crate::foundation::math::{Vec3, utils};
use crate::render::backend::RenderBackend;

/// One overlay line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlaySlot {
    /// Averaged frames per second
    Fps,
    /// Observer position
    Position,
    /// Observer viewing direction
    Orientation,
    /// Simulation time
    Time,
    /// Field of view in whole degrees
    Angle,
}

impl OverlaySlot {
    /// All slots in display order
    pub const ALL: [OverlaySlot; 5] = [Self::Fps, Self::Position, Self::Orientation, Self::Time, Self::Angle];

    /// Line label
    pub fn label(self) -> &'static str {
        match self {
            Self::Fps => "FPS",
            Self::Position => "Position",
            Self::Orientation => "Orientation",
            Self::Time => "Time",
            Self::Angle => "Angle",
        }
    }

    /// Baseline position in pixels from the bottom-left corner
    pub fn screen_position(self) -> [f32; 2] {
        [20.0, 20.0 + 55.0 * self.index() as f32]
    }

    /// Text color (RGB)
    pub fn color(self) -> [f32; 3] {
        [0.0, 1.0, 0.0]
    }

    fn index(self) -> usize {
        match self {
            Self::Fps => 0,
            Self::Position => 1,
            Self::Orientation => 2,
            Self::Time => 3,
            Self::Angle => 4,
        }
    }
}

/// Format a simulation time with six decimals
pub fn format_time(time: f32) -> String {
    format!("{time:.6}")
}

/// Format a field of view as whole degrees, truncating
pub fn format_angle(fov_degrees: f32) -> String {
    format!("{}", fov_degrees.trunc() as i32)
}

/// Current overlay values
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    values: [String; 5],
    font_loaded: bool,
}

impl Overlay {
    /// Create an overlay with empty values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the overlay font; without it the overlay stays silent
    pub fn load_font(&mut self, backend: &mut dyn RenderBackend, path: &str, pixel_size: u32) -> bool {
        match backend.load_font(path, pixel_size) {
            Ok(()) => {
                log::debug!("Overlay font loaded from {path} at {pixel_size}px");
                self.font_loaded = true;
            }
            Err(e) => {
                log::warn!("Overlay font unavailable, continuing without text: {e}");
                self.font_loaded = false;
            }
        }
        self.font_loaded
    }

    /// Whether text can be drawn
    pub fn has_font(&self) -> bool {
        self.font_loaded
    }

    /// Replace the value of one slot
    pub fn update(&mut self, slot: OverlaySlot, value: impl Into<String>) {
        self.values[slot.index()] = value.into();
    }

    /// Set the frame-rate value
    pub fn update_fps(&mut self, fps: u32) {
        self.update(OverlaySlot::Fps, fps.to_string());
    }

    /// Set the observer-dependent values
    pub fn update_observer(&mut self, position: &Vec3, direction: &Vec3, time: f32, fov_degrees: f32) {
        self.update(OverlaySlot::Position, utils::format_vec3(position));
        self.update(OverlaySlot::Orientation, utils::format_vec3(direction));
        self.update(OverlaySlot::Time, format_time(time));
        self.update(OverlaySlot::Angle, format_angle(fov_degrees));
    }

    /// Current value of a slot
    pub fn value(&self, slot: OverlaySlot) -> &str {
        &self.values[slot.index()]
    }

    /// Full display line of a slot
    pub fn line(&self, slot: OverlaySlot) -> String {
        format!("{}: {}", slot.label(), self.value(slot))
    }

    /// Send every line to the backend; nothing is sent without a font
    pub fn submit(&self, backend: &mut dyn RenderBackend) -> crate::render::backend::BackendResult<()> {
        if !self.font_loaded {
            return Ok(());
        }
        for slot in OverlaySlot::ALL {
            backend.set_overlay_text(slot, &self.line(slot))?;
        }
        Ok(())
    }
}
