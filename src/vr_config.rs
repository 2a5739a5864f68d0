// Configuration surface.
//
// Every tunable the interaction layer recognizes lives here, with
// defaults matching the shipped experience. Configs are plain serde
// structs so a runtime can overlay them from JSON.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crosshair::CrosshairConfig;
use crate::grab::GrabConfig;
use crate::teleport::TeleportConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
}

/// Top-level configuration for the whole interaction layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VrConfig {
    /// Which controller drives interaction and aiming.
    pub handedness: Handedness,
    /// Analog value at which a button counts as pressed.
    pub trigger_threshold: f32,
    pub teleport: TeleportConfig,
    pub grab: GrabConfig,
    pub crosshair: CrosshairConfig,
}

impl Default for VrConfig {
    fn default() -> Self {
        VrConfig {
            handedness: Handedness::Right,
            trigger_threshold: 0.5,
            teleport: TeleportConfig::default(),
            grab: GrabConfig::default(),
            crosshair: CrosshairConfig::default(),
        }
    }
}

impl VrConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config: {err}"),
            ConfigError::Parse(err) => write!(f, "failed to parse config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}
