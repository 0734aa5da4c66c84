//! # Physics Configuration
//!
//! Tunables read once at startup. Velocities are in world units per second,
//! y-up.

use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, PhysicsResult};

/// Default vertical velocity change per frame.
pub const DEFAULT_GRAVITY: f32 = -200.0;

/// Default lowest vertical velocity a falling body can reach.
pub const DEFAULT_TERMINAL_VELOCITY: f32 = -10_000.0;

/// Default number of sweep/resolve sub-iterations per frame.
pub const DEFAULT_ITERATIONS: u32 = 4;

/// World-wide physics tunables.
///
/// Missing keys in a config file fall back to the defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Added to every non-kinematic body's vertical velocity once per frame.
    pub gravity: f32,
    /// Vertical velocity is clamped to be no lower than this.
    pub terminal_velocity: f32,
    /// Sweep/resolve passes per frame. Each pass moves a body by
    /// `velocity * dt / iterations`.
    pub iterations: u32,
}

impl PhysicsConfig {
    /// Checks the values can drive a step.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`] for zero iterations or a
    /// non-finite gravity or terminal velocity.
    pub fn validate(&self) -> PhysicsResult<()> {
        if self.iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        if !self.terminal_velocity.is_finite() {
            return Err(PhysicsError::InvalidConfig(format!(
                "terminal_velocity must be finite, got {}",
                self.terminal_velocity
            )));
        }
        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            terminal_velocity: DEFAULT_TERMINAL_VELOCITY,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}
