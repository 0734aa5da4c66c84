//! # Simulation Configuration
//!
//! Loaded once at startup. Every section and key is optional.
//!
//! ```toml
//! [physics]
//! gravity = -200.0
//! terminal_velocity = -10000.0
//! iterations = 4
//!
//! [clock]
//! frame_rate = 60
//! ```

use std::path::Path;

use kindle_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Frame pacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Frames per second of the fixed step.
    pub frame_rate: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { frame_rate: 60 }
    }
}

/// Everything needed to build a [`Simulation`](crate::Simulation).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Physics tunables.
    pub physics: PhysicsConfig,
    /// Frame pacing.
    pub clock: ClockConfig,
}

impl SimConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigParse`] for malformed TOML and
    /// [`SimError::Physics`] or [`SimError::InvalidConfig`] for values out
    /// of range.
    pub fn from_toml_str(text: &str) -> SimResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise the
    /// errors of [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "simulation config loaded");
        Ok(config)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// See [`from_toml_str`](Self::from_toml_str).
    pub fn validate(&self) -> SimResult<()> {
        self.physics.validate()?;
        if self.clock.frame_rate == 0 {
            return Err(SimError::InvalidConfig(
                "clock.frame_rate must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
