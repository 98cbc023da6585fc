//! Configuration system
//!
//! Configuration files are TOML or RON, selected by file extension. The
//! typed settings live in [`app_config`].

pub mod app_config;

pub use serde::{Serialize, Deserialize};
pub use app_config::{ApplicationConfig, EngineSettings, ObserverSettings, SimulationSettings};

use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_data_file(path.as_ref())
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Deserialize any data file, TOML or RON by extension
pub fn load_data_file<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    match extension(path) {
        Some("toml") => {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        }
        Some("ron") => {
            let contents = std::fs::read_to_string(path)?;
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        }
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value was parsed but is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
