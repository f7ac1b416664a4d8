//! Cross-cutting engine configuration.
//!
//! Loaded from TOML with per-section defaults, so an empty file (or no
//! file at all) yields a working configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GuideConfig {
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Pointer movement speed, host-facing scale 0.1..=10.
    #[serde(default = "default_finger_speed")]
    pub finger_speed: f32,
    /// Camera pan speed, host-facing scale 0.1..=10.
    #[serde(default = "default_camera_speed")]
    pub camera_speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write logs to a file instead of stderr.
    #[serde(default)]
    pub to_file: bool,
    /// Directory for log files when `to_file` is set.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_finger_speed() -> f32 {
    5.0
}

fn default_camera_speed() -> f32 {
    2.0
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            finger_speed: default_finger_speed(),
            camera_speed: default_camera_speed(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: false,
            dir: None,
        }
    }
}

impl GuideConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: GuideConfig = toml::from_str(&contents)?;
        config.movement.clamp();
        Ok(config)
    }

    /// Effective pointer speed in scene units per second.
    pub fn finger_speed(&self) -> f32 {
        self.movement.finger_speed.min(10.0) * 200.0
    }

    /// Effective camera pan speed in scene units per second.
    pub fn camera_speed(&self) -> f32 {
        self.movement.camera_speed.min(10.0) * 200.0
    }

    pub fn set_finger_speed(&mut self, speed: f32) {
        self.movement.finger_speed = speed.clamp(0.1, 10.0);
    }

    pub fn set_camera_speed(&mut self, speed: f32) {
        self.movement.camera_speed = speed.clamp(0.1, 10.0);
    }
}

impl MovementConfig {
    fn clamp(&mut self) {
        self.finger_speed = self.finger_speed.clamp(0.1, 10.0);
        self.camera_speed = self.camera_speed.clamp(0.1, 10.0);
    }
}
