//! Per-frame simulation
//!
//! [`SimulationState`] carries the clock and toggles from frame to frame;
//! [`FramePipeline`] turns it, the observer pose and the scene into the
//! parameters of one frame.

pub mod pipeline;
pub mod state;

pub use pipeline::{FRAME_BLOCK, OBJECT_BLOCK, FrameError, FrameParameters, FramePipeline, GroupParameters, MarkerPass, ObjectParameters, SharedParameters};
pub use state::{DebugToggles, SimulationState};
