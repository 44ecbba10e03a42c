//! Input pipeline configuration, loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse input configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatConfig {
    pub name: String,
}

impl Default for SeatConfig {
    fn default() -> Self {
        Self { name: "seat0".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Upper bound on live abstract devices. Hotplug-adds that would exceed it fail.
    pub max_abstract_devices: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { max_abstract_devices: 256 }
    }
}

/// Normalized sub-rectangle of the output layout, all values in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TabletConfig {
    /// Restricts tablet absolute positions to a part of the layout.
    pub map_to_region: Option<MapRegion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub seat: SeatConfig,
    pub devices: DeviceConfig,
    pub tablet: TabletConfig,
    pub logging: LoggingConfig,
}

impl InputConfig {
    /// Loads the configuration at `path`. A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("InputConfig: Loading configuration from '{}'.", path.display());
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents).map_err(|e| {
                error!("InputConfig: Failed to parse config file '{}': {}", path.display(), e);
                e
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("InputConfig: Config file '{}' not found. Using default configuration.", path.display());
                Ok(InputConfig::default())
            }
            Err(e) => {
                error!("InputConfig: Failed to read config file '{}': {}", path.display(), e);
                Err(ConfigError::Io { path: path.display().to_string(), source: e })
            }
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}
