//! # Simulation Error Types
//!
//! All errors that can occur while setting up a simulation.

use std::path::PathBuf;

use kindle_physics::PhysicsError;
use thiserror::Error;

/// Errors in animation authoring.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimationError {
    /// A definition needs at least one frame.
    #[error("animation definition has no frames")]
    NoFrames,

    /// A definition exceeds the per-definition frame limit.
    #[error("animation definition has {count} frames, maximum is {max}")]
    TooManyFrames {
        /// Frames supplied.
        count: usize,
        /// Frame limit.
        max: usize,
    },

    /// An instance referenced a definition that does not exist.
    #[error("unknown animation definition: {0}")]
    UnknownDefinition(u32),

    /// An entity referenced an animation instance that is not live.
    #[error("unknown animation instance: {0}")]
    UnknownInstance(u32),
}

/// Errors that can occur when building a simulation.
#[derive(Error, Debug)]
pub enum SimError {
    /// Config file could not be read.
    #[error("failed to read {path}: {source}", path = path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`SimConfig`](crate::SimConfig).
    #[error("invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A config value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Physics rejected its configuration.
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// Animation authoring failed.
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Result type for simulation setup.
pub type SimResult<T> = Result<T, SimError>;
