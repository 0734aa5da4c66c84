//! # Geometry
//!
//! Axis-aligned box algebra for a y-up 2D world.
//!
//! Everything here is a pure function of its inputs, so renderers may call it
//! for debug drawing outside the physics update.

mod aabb;
mod sweep;
mod vec2;

pub use aabb::Aabb;
pub use sweep::{sweep, Hit};
pub use vec2::Vec2;
