//! # Physics Error Types

use thiserror::Error;

/// Errors that can occur when configuring the physics world.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    /// A configuration value is out of range.
    #[error("invalid physics configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for physics operations.
pub type PhysicsResult<T> = Result<T, PhysicsError>;
