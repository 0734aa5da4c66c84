//! # Collision Filtering
//!
//! A body's layer says what it is, its mask says what it reacts to.

use serde::{Deserialize, Serialize};

/// Layer and mask bits for one body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionFilter {
    /// Layers this body belongs to.
    pub layer: u32,
    /// Layers this body reacts to.
    pub mask: u32,
}

impl CollisionFilter {
    /// No layers.
    pub const NONE: u32 = 0;
    /// Every layer.
    pub const ALL: u32 = u32::MAX;

    /// Creates a filter.
    #[inline]
    #[must_use]
    pub const fn new(layer: u32, mask: u32) -> Self {
        Self { layer, mask }
    }

    /// Filter for level geometry: on `layer`, reacting to everything.
    #[inline]
    #[must_use]
    pub const fn solid(layer: u32) -> Self {
        Self::new(layer, Self::ALL)
    }

    /// Returns true if the two filters accept each other.
    ///
    /// Each side's layer must be in the other side's mask, so the answer
    /// does not depend on which body is moving.
    #[inline]
    #[must_use]
    pub const fn interacts(self, other: Self) -> bool {
        (self.mask & other.layer) != 0 && (other.mask & self.layer) != 0
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self::new(1, Self::ALL)
    }
}
