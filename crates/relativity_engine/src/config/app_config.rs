//! # Application Configuration
//!
//! All startup settings of the viewer in one serializable tree:
//!
//! - **Engine**: logging, window size, overlay font, screenshots, initial toggles
//! - **Observer**: initial pose and movement tuning
//! - **Simulation**: propagation speed and time flow
//! - **Scenario**: name of the built-in scene to load, or a scene file
//!
//! Every section uses `#[serde(default)]`, so a file only needs the values
//! it overrides.

use serde::{Serialize, Deserialize};

use super::{Config, ConfigError};
use crate::foundation::math::Vec3;

/// # Engine Settings
///
/// Process-level behavior that is not part of the physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Framebuffer width in pixels
    pub window_width: u32,
    /// Framebuffer height in pixels
    pub window_height: u32,
    /// Overlay font file
    pub font_path: String,
    /// Overlay font pixel size
    pub font_size: u32,
    /// Directory receiving screenshots
    pub screenshot_dir: String,
    /// Whether simulation time starts frozen
    pub start_paused: bool,
    /// Whether the debug markers start visible
    pub show_markers: bool,
    /// Whether the text overlay starts visible
    pub show_overlay: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window_width: 1600,
            window_height: 900,
            font_path: "assets/fonts/hack.ttf".to_string(),
            font_size: 28,
            screenshot_dir: "screenshots".to_string(),
            start_paused: true,
            show_markers: true,
            show_overlay: true,
        }
    }
}

/// # Observer Settings
///
/// Initial pose and movement tuning of the observer camera. Angles are in
/// degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverSettings {
    /// Start position in the observer rest frame
    pub position: Vec3,
    /// Start yaw in degrees
    pub yaw: f32,
    /// Start pitch in degrees
    pub pitch: f32,
    /// Start vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
    /// Movement speed in units per second
    pub walk_speed: f32,
    /// Movement speed while the running modifier is held
    pub run_speed: f32,
    /// Degrees of rotation per unit of mouse movement at 45° field of view
    pub sensitivity: f32,
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 0.0),
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
            near: 0.1,
            far: 1000.0,
            walk_speed: 3.0,
            run_speed: 30.0,
            sensitivity: 0.4,
        }
    }
}

/// # Simulation Settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Propagation speed of light in world units per second
    pub speed_of_light: f32,
    /// Initial time-flow multiplier
    pub time_flow_multiplier: f32,
    /// Change of the multiplier per frame while a flow key is held
    pub time_flow_step: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            speed_of_light: 1.0,
            time_flow_multiplier: 1.0,
            time_flow_step: 0.1,
        }
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration; this is what the binary loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Built-in scenario name
    pub scenario: String,
    /// Scene description file (TOML or RON); overrides `scenario` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_path: Option<String>,
    /// Process-level settings
    pub engine: EngineSettings,
    /// Observer pose and movement
    pub observer: ObserverSettings,
    /// Propagation speed and time flow
    pub simulation: SimulationSettings,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            scenario: "terrell_boxes".to_string(),
            scenario_path: None,
            engine: EngineSettings::default(),
            observer: ObserverSettings::default(),
            simulation: SimulationSettings::default(),
        }
    }
}

impl ApplicationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !(sim.speed_of_light.is_finite() && sim.speed_of_light > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "speed_of_light must be positive and finite, got {}",
                sim.speed_of_light
            )));
        }
        if !(sim.time_flow_multiplier.is_finite() && sim.time_flow_multiplier >= 0.0) {
            return Err(ConfigError::Invalid("time_flow_multiplier must be non-negative".to_string()));
        }

        if self.engine.window_width == 0 || self.engine.window_height == 0 {
            return Err(ConfigError::Invalid("window dimensions must be non-zero".to_string()));
        }
        if self.engine.window_width > u32::from(u16::MAX) || self.engine.window_height > u32::from(u16::MAX) {
            return Err(ConfigError::Invalid("window dimensions must fit in 16 bits".to_string()));
        }

        let obs = &self.observer;
        if !(obs.near > 0.0 && obs.far > obs.near) {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                obs.near, obs.far
            )));
        }
        if !(1.0..=90.0).contains(&obs.fov) {
            return Err(ConfigError::Invalid(format!("fov must be within [1, 90], got {}", obs.fov)));
        }

        Ok(())
    }

    /// Framebuffer aspect ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.engine.window_width as f32 / self.engine.window_height as f32
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ApplicationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scenario, "terrell_boxes");
        assert!(config.engine.start_paused);
    }

    #[test]
    fn test_rejects_non_positive_speed_of_light() {
        let mut config = ApplicationConfig::default();
        config.simulation.speed_of_light = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.simulation.speed_of_light = f32::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_clip_planes() {
        let mut config = ApplicationConfig::default();
        config.observer.near = 10.0;
        config.observer.far = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let text = r#"
            scenario = "spheres"

            [simulation]
            speed_of_light = 2.0
        "#;
        let config: ApplicationConfig = toml::from_str(text).expect("valid toml");

        assert_eq!(config.scenario, "spheres");
        assert_eq!(config.scenario_path, None);
        assert_eq!(config.simulation.speed_of_light, 2.0);
        assert_eq!(config.simulation.time_flow_step, 0.1);
        assert_eq!(config.observer, ObserverSettings::default());
    }

    #[test]
    fn test_save_and_load_toml_and_ron() {
        let dir = std::env::temp_dir().join(format!("relativity_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");

        let mut config = ApplicationConfig::default();
        config.scenario = "wheels".to_string();
        config.observer.position = Vec3::new(1.0, 2.0, 3.0);
        config.scenario_path = Some("scenes/custom.toml".to_string());

        for name in ["config.toml", "config.ron"] {
            let path = dir.join(name);
            config.save_to_file(&path).expect("save");
            let loaded = ApplicationConfig::load_from_file(&path).expect("load");
            assert_eq!(loaded, config);
        }

        let unsupported = ApplicationConfig::load_from_file(dir.join("config.yaml"));
        assert!(unsupported.is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
