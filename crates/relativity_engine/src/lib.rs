//! # Relativity Engine
//!
//! Kinematics core of a first-person special-relativity viewer. Objects move
//! at constant velocity through a world where light travels at a finite,
//! configurable speed; every frame the engine works out which past event of
//! each object the observer actually sees and hands it to a shading stage.
//!
//! ## Features
//!
//! - **Retarded-event solving**: closed-form past light-cone intersection
//!   for straight worldlines, with a true-position bypass
//! - **Observer pose**: yaw/pitch/fov camera with cached, dirty-flagged
//!   view and projection matrices
//! - **Scenes**: shader groups with local-frame transforms, built-in
//!   Terrell rotation, time dilation and aberration scenarios
//! - **Frame hand-off**: backend-agnostic uniform sink, debug markers,
//!   text overlay and TGA screenshots
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use relativity_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::default();
//!     let mut backend = RecordingBackend::new();
//!     let mut engine = Engine::new(&config, &mut backend)?;
//!
//!     let outcome = engine.frame(1.0 / 60.0, &[InputEvent::KeyPressed(KeyCode::Space)], &mut backend)?;
//!     println!("t = {}", outcome.time);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod physics;
pub mod render;
pub mod scene;
pub mod simulation;
pub mod input;
pub mod ui;
pub mod debug;

mod engine;

pub use engine::{Engine, EngineError, FrameOutcome};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineError, FrameOutcome,
        config::{ApplicationConfig, Config, ConfigError},
        foundation::math::{Vec3, Vec4, Mat4, Mat4Ext},
        physics::{solve_retarded_event, resolve_emission, EmissionEvent, Worldline},
        render::{
            BackendError, BackendResult, ModelHandle, ObserverPose, ProgramHandle, ProgramSource,
            RecordingBackend, RenderBackend, UniformValue,
        },
        scene::{SceneDescription, SceneRegistry},
        simulation::{DebugToggles, FramePipeline, SimulationState},
        input::{InputEvent, KeyCode, MouseButton},
        ui::OverlaySlot,
    };
}
