//! Viewer main loop
//!
//! The [`Engine`] owns everything that survives between frames and runs one
//! loop iteration per [`Engine::frame`] call:
//!
//! 1. frame-rate bookkeeping
//! 2. input: movement, look, zoom, time flow, toggles
//! 3. overlay values from the observer and the clock before this step
//! 4. time advance, per-object solving and the scene hand-off
//! 5. overlay text when enabled
//! 6. presentation
//! 7. screenshot, if requested this frame
//!
//! The window and its event loop stay outside: callers feed raw
//! [`InputEvent`]s and a [`RenderBackend`] each frame.

use std::path::PathBuf;

use crate::config::{ApplicationConfig, ConfigError};
use crate::foundation::time::FpsCounter;
use crate::input::{Command, FrameInput, InputEvent, InputTranslator};
use crate::render::backend::{BackendError, RenderBackend};
use crate::render::camera::ObserverPose;
use crate::render::capture::{CaptureError, ScreenshotWriter};
use crate::scene::{instantiate, instantiate_builtin, SceneDescription, SceneError, SceneRegistry};
use crate::simulation::{DebugToggles, FrameError, FramePipeline, SimulationState};
use crate::ui::Overlay;

/// Engine errors
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Configuration rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scene could not be set up
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// A frame could not be produced
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Screenshot failed
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Backend call failed outside the frame pipeline
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// What a frame reports back to the loop driving it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    /// Simulation time after the frame
    pub time: f32,
    /// Objects handed to the backend
    pub objects: usize,
    /// Fresh frame-rate estimate, once per averaging window
    pub fps: Option<u32>,
    /// Screenshot written this frame
    pub screenshot: Option<PathBuf>,
    /// Escape was pressed
    pub quit_requested: bool,
}

/// Relativistic viewer state and frame driver
pub struct Engine {
    pose: ObserverPose,
    state: SimulationState,
    registry: SceneRegistry,
    overlay: Overlay,
    input: InputTranslator,
    fps: FpsCounter,
    screenshots: ScreenshotWriter,
    window_size: (u32, u32),
}

impl Engine {
    /// Validate `config`, load the overlay font and the configured scenario
    ///
    /// `scenario_path` takes precedence over the built-in `scenario` name.
    ///
    /// A missing font only disables the overlay; any scene resource failure
    /// aborts.
    pub fn new(config: &ApplicationConfig, backend: &mut dyn RenderBackend) -> Result<Self, EngineError> {
        log::info!("Initializing relativity engine...");
        config.validate()?;

        let engine_settings = &config.engine;
        let mut overlay = Overlay::new();
        overlay.load_font(backend, &engine_settings.font_path, engine_settings.font_size);

        let speed_of_light = config.simulation.speed_of_light;
        let (scenario, registry) = match &config.scenario_path {
            Some(path) => {
                let description = SceneDescription::load_from_file(path)?;
                let registry = instantiate(&description, backend, speed_of_light)?;
                (description.name, registry)
            }
            None => (config.scenario.clone(), instantiate_builtin(&config.scenario, backend, speed_of_light)?),
        };
        log::info!(
            "Scenario '{scenario}' ready: {} objects in {} groups",
            registry.len(),
            registry.groups().count()
        );

        Ok(Self {
            pose: ObserverPose::from_settings(&config.observer, config.aspect_ratio()),
            state: SimulationState::from_settings(&config.simulation, engine_settings),
            registry,
            overlay,
            input: InputTranslator::new(config.simulation.time_flow_step),
            fps: FpsCounter::new(FpsCounter::DEFAULT_WINDOW),
            screenshots: ScreenshotWriter::new(&engine_settings.screenshot_dir),
            window_size: (engine_settings.window_width, engine_settings.window_height),
        })
    }

    /// Run one loop iteration over `delta_time` seconds of wall-clock time
    pub fn frame(
        &mut self,
        delta_time: f32,
        events: &[InputEvent],
        backend: &mut dyn RenderBackend,
    ) -> Result<FrameOutcome, EngineError> {
        let fps = self.fps.record(delta_time);
        if let Some(fps) = fps {
            self.overlay.update_fps(fps);
        }

        let input = self.input.process(events);
        self.apply_input(&input, delta_time);

        self.overlay.update_observer(
            &self.pose.position(),
            &self.pose.direction(),
            self.state.time(),
            self.pose.fov(),
        );

        let frame = FramePipeline::run(&mut self.state, delta_time, &self.pose, &self.registry, backend)?;

        if self.state.is_enabled(DebugToggles::SHOW_OVERLAY) {
            self.overlay.submit(backend)?;
        }
        backend.present()?;

        let screenshot = if input.has(Command::Screenshot) {
            let (width, height) = self.window_size;
            Some(self.screenshots.capture(backend, width, height)?)
        } else {
            None
        };

        Ok(FrameOutcome {
            time: self.state.time(),
            objects: frame.object_count(),
            fps,
            screenshot,
            quit_requested: input.has(Command::Quit),
        })
    }

    fn apply_input(&mut self, input: &FrameInput, delta_time: f32) {
        if let Some((width, height)) = input.resized {
            if width > 0 && height > 0 {
                self.window_size = (width, height);
                self.pose.set_aspect_ratio(width as f32 / height as f32);
            }
        }

        if input.running != self.pose.is_running() {
            self.pose.set_running(input.running);
        }
        for direction in &input.movement {
            self.pose.move_in(*direction, delta_time);
        }

        let (look_x, look_y) = input.look;
        if look_x != 0.0 || look_y != 0.0 {
            self.pose.rotate(look_x, look_y);
        }
        if input.zoom != 0.0 {
            self.pose.zoom(input.zoom);
        }
        if input.flow_delta != 0.0 {
            self.state.adjust_flow(input.flow_delta);
        }

        for command in &input.commands {
            match command {
                Command::TogglePause => self.state.toggle_pause(),
                Command::Toggle(flag) => {
                    self.state.toggle(*flag);
                }
                Command::Screenshot | Command::Quit => {}
            }
        }
    }

    /// Observer pose
    pub fn pose(&self) -> &ObserverPose {
        &self.pose
    }

    /// Simulation clock and toggles
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Loaded scene
    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    /// Overlay values
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Current framebuffer size
    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }
}
