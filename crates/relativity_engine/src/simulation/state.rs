//! Simulation clock and debug toggles
//!
//! All per-session mutable state that is not the observer pose lives in
//! [`SimulationState`], which is passed explicitly through every frame.

use bitflags::bitflags;

use crate::config::{EngineSettings, SimulationSettings};

bitflags! {
    /// Runtime debug switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DebugToggles: u32 {
        /// Treat light speed as infinite: draw true positions
        const POSITION_BYPASS = 1 << 0;
        /// Disable Doppler recoloring
        const DOPPLER_OFF = 1 << 1;
        /// Draw the ground plane, axes and velocity arrows
        const SHOW_MARKERS = 1 << 2;
        /// Draw the text overlay
        const SHOW_OVERLAY = 1 << 3;
    }
}

/// Simulation time, its flow and the debug toggles
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    time: f32,
    flow_multiplier: f32,
    paused: bool,
    speed_of_light: f32,
    toggles: DebugToggles,
}

impl SimulationState {
    /// Create a state at time zero
    pub fn new(speed_of_light: f32) -> Self {
        Self {
            time: 0.0,
            flow_multiplier: 1.0,
            paused: false,
            speed_of_light,
            toggles: DebugToggles::SHOW_MARKERS | DebugToggles::SHOW_OVERLAY,
        }
    }

    /// Create the startup state from configuration
    pub fn from_settings(simulation: &SimulationSettings, engine: &EngineSettings) -> Self {
        let mut toggles = DebugToggles::empty();
        toggles.set(DebugToggles::SHOW_MARKERS, engine.show_markers);
        toggles.set(DebugToggles::SHOW_OVERLAY, engine.show_overlay);

        Self {
            time: 0.0,
            flow_multiplier: simulation.time_flow_multiplier.max(0.0),
            paused: engine.start_paused,
            speed_of_light: simulation.speed_of_light,
            toggles,
        }
    }

    /// Builder-style paused flag
    #[must_use]
    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    /// Builder-style toggles
    #[must_use]
    pub fn with_toggles(mut self, toggles: DebugToggles) -> Self {
        self.toggles = toggles;
        self
    }

    /// Advance by a wall-clock step; returns the simulation step applied
    ///
    /// A paused clock applies zero. Time never decreases.
    pub fn advance(&mut self, delta_time: f32) -> f32 {
        let step = if self.paused { 0.0 } else { delta_time.max(0.0) * self.flow_multiplier };
        self.time += step;
        step
    }

    /// Current simulation time
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Current time-flow multiplier
    pub fn flow_multiplier(&self) -> f32 {
        self.flow_multiplier
    }

    /// Change the time-flow multiplier, floored at zero
    pub fn adjust_flow(&mut self, delta: f32) {
        self.flow_multiplier = (self.flow_multiplier + delta).max(0.0);
        log::trace!("Time flow multiplier now {:.2}", self.flow_multiplier);
    }

    /// Whether time is frozen
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze or resume time
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::debug!("Simulation {}", if self.paused { "paused" } else { "resumed" });
    }

    /// Propagation speed of light
    pub fn speed_of_light(&self) -> f32 {
        self.speed_of_light
    }

    /// Current toggles
    pub fn toggles(&self) -> DebugToggles {
        self.toggles
    }

    /// Whether `flag` is set
    pub fn is_enabled(&self, flag: DebugToggles) -> bool {
        self.toggles.contains(flag)
    }

    /// Flip a toggle
    ///
    /// Flipping [`DebugToggles::DOPPLER_OFF`] is ignored while
    /// [`DebugToggles::POSITION_BYPASS`] is set, since true positions are
    /// drawn without any shift. Returns whether the toggle changed.
    pub fn toggle(&mut self, flag: DebugToggles) -> bool {
        if flag.contains(DebugToggles::DOPPLER_OFF) && self.toggles.contains(DebugToggles::POSITION_BYPASS) {
            log::debug!("Doppler toggle ignored while true positions are shown");
            return false;
        }

        self.toggles.toggle(flag);
        log::debug!("Debug toggles now {:?}", self.toggles);
        true
    }
}
